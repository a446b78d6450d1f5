//! In-process reference backend.
//!
//! Tables are named lists of `Record`s behind a mutex. Each connection
//! buffers its writes until commit, so uncommitted work is invisible to
//! other connections and disappears on rollback. Faults can be injected
//! per operation to exercise failure paths.

mod connection;
mod query;

#[cfg(test)]
mod tests;

pub use connection::MemoryConnection;
pub use query::MemoryQuery;

use crate::db::{BackendError, row::Record, tx::Database};
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

///
/// Fault
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fault {
    Connect,
    Begin,
    Commit,
    Rollback,
}

///
/// MemoryStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MemoryStats {
    pub connects: u64,
    pub begins: u64,
    pub commits: u64,
    pub rollbacks: u64,
    pub closes: u64,
}

///
/// MemoryDatabase
///

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    tables: Mutex<BTreeMap<String, Vec<Record>>>,
    faults: FaultFlags,
    stats: Counters,
}

#[derive(Default)]
struct FaultFlags {
    connect: AtomicBool,
    begin: AtomicBool,
    commit: AtomicBool,
    rollback: AtomicBool,
}

#[derive(Default)]
struct Counters {
    connects: AtomicU64,
    begins: AtomicU64,
    commits: AtomicU64,
    rollbacks: AtomicU64,
    closes: AtomicU64,
}

impl MemoryDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert committed rows directly, outside any transaction.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Record>) {
        self.tables().entry(table.to_string()).or_default().extend(rows);
    }

    /// Committed contents of `table`.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables().get(table).cloned().unwrap_or_default()
    }

    /// Query over committed rows, as seen outside any transaction.
    #[must_use]
    pub fn query(&self, table: &str) -> MemoryQuery {
        MemoryQuery::new(self.rows(table))
    }

    /// Make the next call of `fault`'s operation fail once.
    pub fn fail_next(&self, fault: Fault) {
        self.fault_flag(fault).store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        let counters = &self.inner.stats;
        let load = |counter: &AtomicU64| counter.load(Ordering::SeqCst);

        MemoryStats {
            connects: load(&counters.connects),
            begins: load(&counters.begins),
            commits: load(&counters.commits),
            rollbacks: load(&counters.rollbacks),
            closes: load(&counters.closes),
        }
    }

    fn tables(&self) -> MutexGuard<'_, BTreeMap<String, Vec<Record>>> {
        self.inner
            .tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn fault_flag(&self, fault: Fault) -> &AtomicBool {
        let faults = &self.inner.faults;
        match fault {
            Fault::Connect => &faults.connect,
            Fault::Begin => &faults.begin,
            Fault::Commit => &faults.commit,
            Fault::Rollback => &faults.rollback,
        }
    }

    fn check_fault(&self, fault: Fault) -> Result<(), BackendError> {
        if self.fault_flag(fault).swap(false, Ordering::SeqCst) {
            return Err(BackendError::new(format!("injected {fault:?} failure")));
        }

        Ok(())
    }

    fn count(&self, counter: fn(&Counters) -> &AtomicU64) {
        counter(&self.inner.stats).fetch_add(1, Ordering::SeqCst);
    }
}

impl Database for MemoryDatabase {
    type Connection = MemoryConnection;

    async fn connect(&self) -> Result<MemoryConnection, BackendError> {
        self.check_fault(Fault::Connect)?;
        self.count(|c| &c.connects);

        Ok(MemoryConnection::new(self.clone()))
    }
}
