use crate::db::tx::{Database, TransactionError, TransactionHandle};
use std::fmt;
use ulid::Ulid;

///
/// RequestId
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RequestId(Ulid);

impl RequestId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

///
/// RequestContext
///
/// Explicit per-request state passed by `&mut` through the call chain.
/// Holds at most one transaction handle, attached and detached by the
/// lifecycle controller.
///

pub struct RequestContext<D: Database> {
    id: RequestId,
    handle: Option<TransactionHandle<D>>,
}

impl<D: Database> RequestContext<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(RequestId::generate())
    }

    #[must_use]
    pub const fn with_id(id: RequestId) -> Self {
        Self { id, handle: None }
    }

    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    #[must_use]
    pub const fn has_transaction(&self) -> bool {
        self.handle.is_some()
    }

    /// The request's transaction handle.
    ///
    /// Fails with `HandleMissing` when called outside a lifecycle-managed
    /// request; that is a wiring bug, not a client error.
    pub fn transaction(&mut self) -> Result<&mut TransactionHandle<D>, TransactionError> {
        self.handle.as_mut().ok_or(TransactionError::HandleMissing)
    }

    pub(crate) fn attach(&mut self, handle: TransactionHandle<D>) -> Result<(), TransactionError> {
        if self.handle.is_some() {
            return Err(TransactionError::HandleAlreadyAttached);
        }
        self.handle = Some(handle);

        Ok(())
    }

    pub(crate) const fn detach(&mut self) -> Option<TransactionHandle<D>> {
        self.handle.take()
    }
}

impl<D: Database> Default for RequestContext<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Database> fmt::Debug for RequestContext<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("has_transaction", &self.has_transaction())
            .finish()
    }
}
