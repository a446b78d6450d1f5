use crate::db::order::SortError;
use thiserror::Error as ThisError;

///
/// CursorError
///
/// Cursor token encode/decode failures. Every decode-side variant is a
/// malformed client cursor; `MissingField`, `NullTupleValue` and `Encode`
/// are server-side.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CursorError {
    #[error("cursor token is empty")]
    Empty,

    #[error("cursor token exceeds max length: {len} chars (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("cursor token is not valid base64: {reason}")]
    Base64 { reason: String },

    #[error("cursor payload is not valid: {reason}")]
    Payload { reason: String },

    #[error("cursor order is invalid: {0}")]
    Order(#[source] SortError),

    #[error("cursor values {found:?} do not match order columns {expected:?}")]
    ValuesMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("row is missing order column '{field}' needed for the next cursor")]
    MissingField { field: String },

    #[error("cursor value for '{field}' is null and cannot join a row-value comparison")]
    NullTupleValue { field: String },

    #[error("failed to encode cursor: {reason}")]
    Encode { reason: String },
}

impl CursorError {
    /// True when the failure is attributable to client input.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        !matches!(
            self,
            Self::MissingField { .. } | Self::NullTupleValue { .. } | Self::Encode { .. }
        )
    }
}
