use crate::db::{
    BackendError,
    tx::{
        Connection, Database, RequestId, SideEffect, SideEffectPolicy, TransactionError,
        pool::PooledConnection, sweep::OrphanSender,
    },
};
use tracing::debug;

///
/// TxState
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TxState {
    Open,
    Committing,
    RollingBack,
    Released,
}

///
/// TransactionHandle
///
/// One request's open transaction: the pooled connection it runs on, the
/// single-assignment success flag, and the request's side-effect queues.
///
/// A handle dropped before the lifecycle resolved it (for example because
/// the request future was cancelled) hands its connection to the orphan
/// sweeper, which rolls it back and returns it to the pool.
///

pub struct TransactionHandle<D: Database> {
    request_id: RequestId,
    conn: Option<PooledConnection<D>>,
    state: TxState,
    success: bool,
    policy: SideEffectPolicy,
    compensations: Vec<Box<dyn SideEffect>>,
    after_commit: Vec<Box<dyn SideEffect>>,
    orphans: OrphanSender<D>,
}

impl<D: Database> TransactionHandle<D> {
    pub(crate) fn new(
        request_id: RequestId,
        conn: PooledConnection<D>,
        policy: SideEffectPolicy,
        orphans: OrphanSender<D>,
    ) -> Self {
        Self {
            request_id,
            conn: Some(conn),
            state: TxState::Open,
            success: false,
            policy,
            compensations: Vec::new(),
            after_commit: Vec::new(),
            orphans,
        }
    }

    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub const fn state(&self) -> TxState {
        self.state
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Connection carrying this request's transaction.
    pub fn connection(&mut self) -> Result<&mut D::Connection, TransactionError> {
        self.ensure_open()?;

        self.conn
            .as_mut()
            .map(PooledConnection::get_mut)
            .ok_or(TransactionError::HandleReleased)
    }

    /// Record that business logic completed normally. May be called once.
    pub fn mark_success(&mut self) -> Result<(), TransactionError> {
        self.ensure_open()?;
        if self.success {
            return Err(TransactionError::OutcomeAlreadyMarked);
        }
        self.success = true;

        Ok(())
    }

    /// Register a side effect under the configured policy.
    pub async fn side_effect(&mut self, effect: impl SideEffect) -> Result<(), TransactionError> {
        match self.policy {
            SideEffectPolicy::BeforeCommit => self.before_commit(effect).await,
            SideEffectPolicy::AfterCommit => self.after_commit(effect),
        }
    }

    /// Run `effect` now; its compensation runs if the transaction rolls back.
    pub async fn before_commit(&mut self, effect: impl SideEffect) -> Result<(), TransactionError> {
        self.ensure_open()?;

        let mut effect = Box::new(effect);
        let applied = effect.apply().await;
        if let Err(source) = applied {
            return Err(TransactionError::SideEffect {
                label: effect.label().to_string(),
                source,
            });
        }
        debug!(request_id = %self.request_id, effect = effect.label(), "side effect applied before commit");
        self.compensations.push(effect);

        Ok(())
    }

    /// Queue `effect` to run once the transaction has committed.
    pub fn after_commit(&mut self, effect: impl SideEffect) -> Result<(), TransactionError> {
        self.ensure_open()?;
        self.after_commit.push(Box::new(effect));

        Ok(())
    }

    const fn ensure_open(&self) -> Result<(), TransactionError> {
        match self.state {
            TxState::Open => Ok(()),
            _ => Err(TransactionError::HandleReleased),
        }
    }

    // resolution, reserved to the lifecycle controller

    pub(crate) async fn commit(&mut self) -> Result<(), BackendError> {
        self.state = TxState::Committing;
        match self.conn.as_mut() {
            Some(conn) => conn.get_mut().commit().await,
            None => Err(BackendError::new("transaction handle has no connection")),
        }
    }

    pub(crate) async fn rollback(&mut self) -> Result<(), BackendError> {
        self.state = TxState::RollingBack;
        match self.conn.as_mut() {
            Some(conn) => conn.get_mut().rollback().await,
            None => Err(BackendError::new("transaction handle has no connection")),
        }
    }

    pub(crate) fn take_compensations(&mut self) -> Vec<Box<dyn SideEffect>> {
        std::mem::take(&mut self.compensations)
    }

    pub(crate) fn take_after_commit(&mut self) -> Vec<Box<dyn SideEffect>> {
        std::mem::take(&mut self.after_commit)
    }

    /// Give up the connection. Returns `None` once it was already taken.
    pub(crate) fn release(&mut self) -> Option<PooledConnection<D>> {
        self.state = TxState::Released;
        self.conn.take()
    }
}

impl<D: Database> Drop for TransactionHandle<D> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.orphans.send(self.request_id, conn);
        }
    }
}
