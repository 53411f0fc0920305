//! Observability: runtime counters and the sink abstraction.
//!
//! Record, link, identity, and stream code emit `MetricsEvent`s through
//! `sink::record`; nothing outside this module touches counter state.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, TypeCounters};
pub use sink::{
    LinkResolution, MetricsEvent, MetricsSink, RefreshOutcome, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
