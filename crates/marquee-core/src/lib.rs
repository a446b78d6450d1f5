//! Core runtime for Marquee: values, ordering, cursor codec, keyset
//! predicates, paginators, and the per-request transaction lifecycle.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod value;

pub use error::{Error, ErrorClass};

///
/// CONSTANTS
///

/// Maximum accepted length of a cursor token, in characters.
///
/// Cursor tokens arrive from untrusted clients; anything longer than this is
/// rejected before base64 decoding.
pub const MAX_CURSOR_TOKEN_LEN: usize = 8 * 1024;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, or backends are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            direction::Direction,
            order::{OrderSpec, OrderTerm},
            row::{FieldPresence, Record, Row},
        },
        model::EntityModel,
        value::Value,
    };
}
