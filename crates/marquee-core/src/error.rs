use crate::{
    config::ConfigError,
    db::{cursor::CursorError, order::SortError, query::PageError, tx::TransactionError},
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level error for callers that do not care which subsystem failed.
/// Every variant is classified so a transport layer can map it to a status
/// without matching on subsystem internals.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Sort(#[from] SortError),

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Sort(_) => ErrorClass::InvalidInput,
            Self::Cursor(err) => cursor_class(err),
            Self::Page(err) => err.class(),
            Self::Transaction(err) => err.class(),
            Self::Config(_) => ErrorClass::Internal,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Sort(_) | Self::Cursor(_) | Self::Page(_) => ErrorOrigin::Query,
            Self::Transaction(_) => ErrorOrigin::Transaction,
            Self::Config(_) => ErrorOrigin::Config,
        }
    }

    /// True when the same request may succeed if retried unchanged.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        self.class().is_retriable()
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {self}", self.origin(), self.class())
    }
}

pub(crate) const fn cursor_class(err: &CursorError) -> ErrorClass {
    if err.is_malformed() {
        ErrorClass::InvalidInput
    } else {
        ErrorClass::Internal
    }
}

///
/// ErrorClass
///
/// Caller-facing taxonomy. `InvalidInput` is the client's fault
/// (4xx-equivalent); everything else is the server's.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidInput,
    Unavailable,
    Conflict,
    Internal,
}

impl ErrorClass {
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Unavailable | Self::Conflict)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidInput => "invalid_input",
            Self::Unavailable => "unavailable",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Query,
    Transaction,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Query => "query",
            Self::Transaction => "transaction",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::BackendError;

    #[test]
    fn client_faults_are_invalid_input() {
        let sort: Error = SortError::Empty.into();
        let cursor: Error = CursorError::Empty.into();
        let take: Error = PageError::InvalidTake.into();

        for err in [sort, cursor, take] {
            assert_eq!(err.class(), ErrorClass::InvalidInput, "{err}");
            assert!(!err.is_retriable());
        }
    }

    #[test]
    fn server_side_cursor_failures_are_internal() {
        let err: Error = CursorError::MissingField {
            field: "id".to_string(),
        }
        .into();

        assert_eq!(err.class(), ErrorClass::Internal);
    }

    #[test]
    fn pool_exhaustion_is_retriable() {
        let err: Error = TransactionError::ResourceUnavailable { waited_ms: 50 }.into();

        assert_eq!(err.class(), ErrorClass::Unavailable);
        assert!(err.is_retriable());
        assert!(err.display_with_class().starts_with("transaction:unavailable: "));
    }

    #[test]
    fn page_source_failures_are_internal() {
        let err: Error = PageError::Source(BackendError::new("disk on fire")).into();

        assert_eq!(err.class(), ErrorClass::Internal);
        assert_eq!(err.origin(), ErrorOrigin::Query);
    }
}
