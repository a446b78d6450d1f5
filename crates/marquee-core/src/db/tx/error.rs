use crate::{ErrorClass, db::BackendError, db::tx::SideEffectError};
use thiserror::Error as ThisError;

///
/// TransactionError
///

#[derive(Debug, ThisError)]
pub enum TransactionError {
    #[error("no database connection became available within {waited_ms}ms")]
    ResourceUnavailable { waited_ms: u64 },

    #[error("failed to open database connection: {0}")]
    Connect(#[source] BackendError),

    #[error("failed to begin transaction: {0}")]
    Begin(#[source] BackendError),

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] BackendError),

    #[error("failed to roll back transaction: {0}")]
    Rollback(#[source] BackendError),

    #[error("failed to release database connection: {0}")]
    Release(#[source] BackendError),

    #[error("request context carries no transaction handle")]
    HandleMissing,

    #[error("request context already carries a transaction handle")]
    HandleAlreadyAttached,

    #[error("transaction handle was already released")]
    HandleReleased,

    #[error("transaction outcome was already marked")]
    OutcomeAlreadyMarked,

    #[error("business logic completed without marking the transaction successful")]
    OutcomeNotMarked,

    #[error("side effect '{label}' failed: {source}")]
    SideEffect {
        label: String,
        #[source]
        source: SideEffectError,
    },
}

impl TransactionError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::ResourceUnavailable { .. } | Self::Connect(_) => ErrorClass::Unavailable,
            Self::Commit(_) => ErrorClass::Conflict,
            Self::Begin(_)
            | Self::Rollback(_)
            | Self::Release(_)
            | Self::HandleMissing
            | Self::HandleAlreadyAttached
            | Self::HandleReleased
            | Self::OutcomeAlreadyMarked
            | Self::OutcomeNotMarked
            | Self::SideEffect { .. } => ErrorClass::Internal,
        }
    }

    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        self.class().is_retriable()
    }
}
