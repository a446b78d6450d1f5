use crate::db::BackendError;

///
/// Database
///
/// A database capable of handing out connections.
///

pub trait Database: Send + Sync + 'static {
    type Connection: Connection;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection, BackendError>> + Send;
}

///
/// Connection
///
/// One backend session able to run a single transaction at a time.
///

pub trait Connection: Send + 'static {
    fn begin(&mut self) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn commit(&mut self) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn rollback(&mut self) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Tear the session down. The connection is not reused afterwards.
    fn close(self) -> impl Future<Output = Result<(), BackendError>> + Send
    where
        Self: Sized,
    {
        async { Ok(()) }
    }
}
