//! Observability: lifecycle and pagination telemetry.
//!
//! Runtime code never touches counters directly. All instrumentation flows
//! through `MetricsEvent` and a `MetricsSink`; logs go through `tracing`.

mod metrics;
mod sink;

pub use metrics::{CounterSink, MetricsSnapshot};
pub use sink::{MetricsEvent, MetricsSink, NoopSink, SharedSink, noop_sink};
