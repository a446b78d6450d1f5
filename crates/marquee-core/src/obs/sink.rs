//! Metrics sink boundary.
//!
//! The transaction controller, the pool and the paginators report through
//! this trait and never depend on a concrete sink.

use std::sync::Arc;

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    TxBegin,
    TxCommit,
    TxRollback,
    TxRelease,
    TxCommitFailed,
    PoolExhausted,
    OrphanSwept,
    PageServed {
        entity_path: &'static str,
        rows: u64,
        first_page: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

/// Sink handle shared by every component of one runtime.
pub type SharedSink = Arc<dyn MetricsSink>;

///
/// NoopSink
///
/// Default sink; discards every event.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _: MetricsEvent) {}
}

#[must_use]
pub fn noop_sink() -> SharedSink {
    Arc::new(NoopSink)
}
