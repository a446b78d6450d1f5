use crate::{
    ErrorClass,
    db::{BackendError, cursor::CursorError, order::SortError},
    error::cursor_class,
};
use thiserror::Error as ThisError;

///
/// PageError
///

#[derive(Debug, ThisError)]
pub enum PageError {
    #[error("invalid sort: {0}")]
    Sort(#[from] SortError),

    #[error("malformed cursor: {0}")]
    Cursor(#[from] CursorError),

    #[error("take must be at least 1")]
    InvalidTake,

    #[error("page must be at least 1")]
    InvalidPage,

    #[error("limit must be at least 1")]
    InvalidLimit,

    #[error("page source failed: {0}")]
    Source(#[source] BackendError),
}

impl PageError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Sort(_) | Self::InvalidTake | Self::InvalidPage | Self::InvalidLimit => {
                ErrorClass::InvalidInput
            }
            Self::Cursor(err) => cursor_class(err),
            Self::Source(_) => ErrorClass::Internal,
        }
    }
}
