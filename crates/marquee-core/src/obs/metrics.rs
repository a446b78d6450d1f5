use crate::obs::sink::{MetricsEvent, MetricsSink};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

///
/// CounterSink
///
/// Process-local sink that keeps one atomic counter per event kind.
///

#[derive(Debug, Default)]
pub struct CounterSink {
    tx_begun: AtomicU64,
    tx_committed: AtomicU64,
    tx_rolled_back: AtomicU64,
    tx_released: AtomicU64,
    tx_commit_failed: AtomicU64,
    pool_exhausted: AtomicU64,
    orphans_swept: AtomicU64,
    pages_served: AtomicU64,
    rows_served: AtomicU64,
}

impl CounterSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of every counter.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        MetricsSnapshot {
            tx_begun: load(&self.tx_begun),
            tx_committed: load(&self.tx_committed),
            tx_rolled_back: load(&self.tx_rolled_back),
            tx_released: load(&self.tx_released),
            tx_commit_failed: load(&self.tx_commit_failed),
            pool_exhausted: load(&self.pool_exhausted),
            orphans_swept: load(&self.orphans_swept),
            pages_served: load(&self.pages_served),
            rows_served: load(&self.rows_served),
        }
    }
}

impl MetricsSink for CounterSink {
    fn record(&self, event: MetricsEvent) {
        let bump = |counter: &AtomicU64, by: u64| {
            counter.fetch_add(by, Ordering::Relaxed);
        };

        match event {
            MetricsEvent::TxBegin => bump(&self.tx_begun, 1),
            MetricsEvent::TxCommit => bump(&self.tx_committed, 1),
            MetricsEvent::TxRollback => bump(&self.tx_rolled_back, 1),
            MetricsEvent::TxRelease => bump(&self.tx_released, 1),
            MetricsEvent::TxCommitFailed => bump(&self.tx_commit_failed, 1),
            MetricsEvent::PoolExhausted => bump(&self.pool_exhausted, 1),
            MetricsEvent::OrphanSwept => bump(&self.orphans_swept, 1),
            MetricsEvent::PageServed { rows, .. } => {
                bump(&self.pages_served, 1);
                bump(&self.rows_served, rows);
            }
        }
    }
}

///
/// MetricsSnapshot
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub tx_begun: u64,
    pub tx_committed: u64,
    pub tx_rolled_back: u64,
    pub tx_released: u64,
    pub tx_commit_failed: u64,
    pub pool_exhausted: u64,
    pub orphans_swept: u64,
    pub pages_served: u64,
    pub rows_served: u64,
}

///
/// TESTS
///
