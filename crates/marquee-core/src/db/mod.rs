//! Data-layer runtime: ordering, cursors, keyset predicates, paginators,
//! the transaction lifecycle, and the in-memory reference backend.

pub mod cursor;
pub mod direction;
pub mod memory;
pub mod order;
pub mod predicate;
pub mod query;
pub mod row;
pub mod tx;

use thiserror::Error as ThisError;

///
/// BackendError
///
/// Failure reported by a database backend (connect, begin, statement,
/// commit, rollback). Backends flatten their native errors into a message.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
