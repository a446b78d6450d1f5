//! ## Crate layout
//! - `core`: values, ordering, cursor codec, keyset predicates, paginators,
//!   the per-request transaction lifecycle, config, and observability.
//!
//! The `prelude` module carries the vocabulary request handlers need:
//! pagination requests and pages, the request context, and the transaction
//! controller.

pub use marquee_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::{Error, ErrorClass};

///
/// Handler Prelude
///

pub mod prelude {
    pub use crate::core::{
        config::MarqueeConfig,
        db::{
            query::{
                CursorPage, CursorPageRequest, CursorPaginator, OffsetPageRequest, OffsetPaginator,
            },
            tx::{RequestContext, TransactionHandle, TransactionLifecycle},
        },
        model::catalog,
        prelude::*,
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// TESTS
///
