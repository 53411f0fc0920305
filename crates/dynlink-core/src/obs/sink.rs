//! Metrics sink boundary.
//!
//! Runtime code MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, sync::Arc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Arc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// LinkResolution
/// How a decoded link found its record.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkResolution {
    Resident,
    Placeholder,
}

///
/// RefreshOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefreshOutcome {
    Loaded,
    Gone,
    TimedOut,
    Failed,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    LinkEncoded {
        record_type: &'a str,
    },
    LinkDecoded {
        record_type: &'a str,
        resolution: LinkResolution,
    },
    LinkRejected {
        record_type: Option<&'a str>,
    },
    RecordRefresh {
        record_type: &'a str,
        outcome: RefreshOutcome,
    },
    WrapperResolved {
        created: bool,
    },
    StreamWritten {
        format: &'static str,
        items: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

///
/// GlobalMetricsSink
/// Default sink that writes into thread-local counter state.
/// Acts as the concrete sink when no scoped override is installed.
///

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::LinkEncoded { record_type } => {
                metrics::with_state_mut(|m| {
                    m.ops.links_encoded = m.ops.links_encoded.saturating_add(1);
                    metrics::with_type_mut(m, record_type, |t| {
                        t.links_encoded = t.links_encoded.saturating_add(1);
                    });
                });
            }

            MetricsEvent::LinkDecoded {
                record_type,
                resolution,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.links_decoded = m.ops.links_decoded.saturating_add(1);
                    match resolution {
                        LinkResolution::Resident => {
                            m.ops.links_resident = m.ops.links_resident.saturating_add(1);
                        }
                        LinkResolution::Placeholder => {
                            m.ops.links_placeholder = m.ops.links_placeholder.saturating_add(1);
                        }
                    }
                    metrics::with_type_mut(m, record_type, |t| {
                        t.links_decoded = t.links_decoded.saturating_add(1);
                    });
                });
            }

            MetricsEvent::LinkRejected { record_type } => {
                metrics::with_state_mut(|m| {
                    m.ops.links_rejected = m.ops.links_rejected.saturating_add(1);
                    if let Some(record_type) = record_type {
                        metrics::with_type_mut(m, record_type, |t| {
                            t.links_rejected = t.links_rejected.saturating_add(1);
                        });
                    }
                });
            }

            MetricsEvent::RecordRefresh {
                record_type,
                outcome,
            } => {
                let failed = outcome != RefreshOutcome::Loaded;
                metrics::with_state_mut(|m| {
                    m.ops.refreshes = m.ops.refreshes.saturating_add(1);
                    if failed {
                        m.ops.refresh_failures = m.ops.refresh_failures.saturating_add(1);
                    }
                    metrics::with_type_mut(m, record_type, |t| {
                        t.refreshes = t.refreshes.saturating_add(1);
                        if failed {
                            t.refresh_failures = t.refresh_failures.saturating_add(1);
                        }
                    });
                });
            }

            MetricsEvent::WrapperResolved { created } => {
                metrics::with_state_mut(|m| {
                    if created {
                        m.ops.wrappers_created = m.ops.wrappers_created.saturating_add(1);
                    } else {
                        m.ops.wrappers_reused = m.ops.wrappers_reused.saturating_add(1);
                    }
                });
            }

            MetricsEvent::StreamWritten { format, items } => {
                metrics::with_state_mut(|m| {
                    m.ops.streams_written = m.ops.streams_written.saturating_add(1);
                    m.ops.items_streamed = m.ops.items_streamed.saturating_add(items);
                    let entry = m.formats.entry(format.to_string()).or_default();
                    *entry = entry.saturating_add(items);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Arc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Arc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(previous);

    f()
}

///
/// TESTS
///
