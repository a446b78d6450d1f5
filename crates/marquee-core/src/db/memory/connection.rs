use crate::db::{
    BackendError,
    memory::{Fault, MemoryDatabase, MemoryQuery},
    predicate::{Predicate, eval},
    row::Record,
    tx::Connection,
};

///
/// PendingWrite
///

#[derive(Clone, Debug)]
enum PendingWrite {
    Insert { table: String, record: Record },
    DeleteWhere { table: String, predicate: Predicate },
}

impl PendingWrite {
    fn apply(&self, table: &str, rows: &mut Vec<Record>) {
        match self {
            Self::Insert { table: t, record } if t == table => rows.push(record.clone()),
            Self::DeleteWhere { table: t, predicate } if t == table => {
                rows.retain(|row| !eval(row, predicate));
            }
            _ => {}
        }
    }

    fn table(&self) -> &str {
        match self {
            Self::Insert { table, .. } | Self::DeleteWhere { table, .. } => table,
        }
    }
}

///
/// MemoryConnection
///
/// Session on a `MemoryDatabase`. Writes require an open transaction and
/// stay private to this connection until commit.
///

pub struct MemoryConnection {
    db: MemoryDatabase,
    pending: Option<Vec<PendingWrite>>,
}

impl MemoryConnection {
    pub(crate) const fn new(db: MemoryDatabase) -> Self {
        Self { db, pending: None }
    }

    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    pub async fn insert(&mut self, table: &str, record: Record) -> Result<(), BackendError> {
        self.pending_mut()?.push(PendingWrite::Insert {
            table: table.to_string(),
            record,
        });
        tokio::task::yield_now().await;

        Ok(())
    }

    /// Delete rows matching `predicate`; returns how many this removes.
    pub async fn delete_where(
        &mut self,
        table: &str,
        predicate: Predicate,
    ) -> Result<u64, BackendError> {
        let removed = self
            .rows(table)
            .iter()
            .filter(|row| eval(*row, &predicate))
            .count() as u64;

        self.pending_mut()?.push(PendingWrite::DeleteWhere {
            table: table.to_string(),
            predicate,
        });
        tokio::task::yield_now().await;

        Ok(removed)
    }

    /// Rows of `table` as this connection sees them, own writes included.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Record> {
        let mut rows = self.db.rows(table);
        for write in self.pending.iter().flatten() {
            write.apply(table, &mut rows);
        }

        rows
    }

    #[must_use]
    pub fn query(&self, table: &str) -> MemoryQuery {
        MemoryQuery::new(self.rows(table))
    }

    fn pending_mut(&mut self) -> Result<&mut Vec<PendingWrite>, BackendError> {
        self.pending
            .as_mut()
            .ok_or_else(|| BackendError::new("no transaction is open on this connection"))
    }
}

impl Connection for MemoryConnection {
    async fn begin(&mut self) -> Result<(), BackendError> {
        if self.pending.is_some() {
            return Err(BackendError::new("a transaction is already open on this connection"));
        }
        self.db.check_fault(Fault::Begin)?;
        self.db.count(|c| &c.begins);
        self.pending = Some(Vec::new());

        Ok(())
    }

    async fn commit(&mut self) -> Result<(), BackendError> {
        if self.pending.is_none() {
            return Err(BackendError::new("no transaction is open on this connection"));
        }
        // a failed commit leaves the transaction open for rollback
        self.db.check_fault(Fault::Commit)?;

        let writes = self.pending.take().unwrap_or_default();
        {
            let mut tables = self.db.tables();
            for write in &writes {
                let rows = tables.entry(write.table().to_string()).or_default();
                write.apply(write.table(), rows);
            }
        }
        self.db.count(|c| &c.commits);

        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), BackendError> {
        self.db.check_fault(Fault::Rollback)?;
        self.pending = None;
        self.db.count(|c| &c.rollbacks);

        Ok(())
    }

    async fn close(self) -> Result<(), BackendError> {
        self.db.count(|c| &c.closes);

        Ok(())
    }
}
