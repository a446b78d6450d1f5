//! Module: db::tx
//! Responsibility: one database transaction per request, resolved exactly
//! once by commit or rollback, with its connection released exactly once.
//! Does not own: statement execution (backend connections) or pagination.
//! Boundary: business logic only sees `RequestContext` and
//! `TransactionHandle`; resolution is reserved to `TransactionLifecycle`.

mod backend;
mod context;
mod effect;
mod error;
mod handle;
mod lifecycle;
mod pool;
mod sweep;


pub use backend::{Connection, Database};
pub use context::{RequestContext, RequestId};
pub use effect::{BoxFuture, FileRelocation, SideEffect, SideEffectError, SideEffectPolicy};
pub use error::TransactionError;
pub use handle::{TransactionHandle, TxState};
pub use lifecycle::TransactionLifecycle;
pub use pool::{Pool, PooledConnection};
