use crate::{
    config::PoolConfig,
    db::tx::{Database, TransactionError, backend::Connection},
};
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore},
    time::timeout,
};
use tracing::{debug, warn};

///
/// Pool
///
/// Bounded connection pool. A semaphore caps the number of checked-out
/// connections; returned connections are parked on an idle stack and reused
/// before new ones are opened.
///

pub struct Pool<D: Database> {
    inner: Arc<PoolInner<D>>,
}

struct PoolInner<D: Database> {
    database: D,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<D::Connection>>,
    max_connections: usize,
    acquire_timeout: Duration,
}

impl<D: Database> Clone for Pool<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Database> Pool<D> {
    #[must_use]
    pub fn new(database: D, config: &PoolConfig) -> Self {
        let max_connections = config.max_connections.max(1);

        Self {
            inner: Arc::new(PoolInner {
                database,
                permits: Arc::new(Semaphore::new(max_connections)),
                idle: Mutex::new(Vec::with_capacity(max_connections)),
                max_connections,
                acquire_timeout: config.acquire_timeout(),
            }),
        }
    }

    #[must_use]
    pub fn database(&self) -> &D {
        &self.inner.database
    }

    #[must_use]
    pub fn max_connections(&self) -> usize {
        self.inner.max_connections
    }

    /// Connections that can be checked out right now without waiting.
    #[must_use]
    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }

    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.inner
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check out a connection, waiting at most the configured acquire timeout.
    pub async fn acquire(&self) -> Result<PooledConnection<D>, TransactionError> {
        let waited_ms = u64::try_from(self.inner.acquire_timeout.as_millis()).unwrap_or(u64::MAX);
        let permit = match timeout(
            self.inner.acquire_timeout,
            Arc::clone(&self.inner.permits).acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) | Err(_) => {
                warn!(
                    max_connections = self.inner.max_connections,
                    waited_ms, "connection pool exhausted"
                );
                return Err(TransactionError::ResourceUnavailable { waited_ms });
            }
        };

        let idle = self
            .inner
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let conn = match idle {
            Some(conn) => conn,
            None => {
                debug!("opening new database connection");
                self.inner
                    .database
                    .connect()
                    .await
                    .map_err(TransactionError::Connect)?
            }
        };

        Ok(PooledConnection {
            conn,
            pool: self.clone(),
            permit,
        })
    }
}

///
/// PooledConnection
///
/// A checked-out connection. `release` parks it for reuse; `discard` closes
/// it. Dropping it closes the connection and frees its slot.
///

pub struct PooledConnection<D: Database> {
    conn: D::Connection,
    pool: Pool<D>,
    permit: OwnedSemaphorePermit,
}

impl<D: Database> PooledConnection<D> {
    pub const fn get_mut(&mut self) -> &mut D::Connection {
        &mut self.conn
    }

    /// Return the connection to the idle stack.
    pub fn release(self) {
        let Self { conn, pool, permit } = self;

        pool.inner
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(conn);
        drop(permit);
    }

    /// Close the connection instead of reusing it.
    pub async fn discard(self) -> Result<(), TransactionError> {
        let Self { conn, permit, .. } = self;
        let closed = conn.close().await.map_err(TransactionError::Release);
        drop(permit);

        closed
    }
}
