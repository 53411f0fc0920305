use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters for link, record, and stream operations.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub types: BTreeMap<String, TypeCounters>,
    /// Items streamed, keyed by format label.
    pub formats: BTreeMap<String, u64>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            types: BTreeMap::new(),
            formats: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Link codec
    pub links_encoded: u64,
    pub links_decoded: u64,
    pub links_resident: u64,
    pub links_placeholder: u64,
    pub links_rejected: u64,

    // Partial records
    pub refreshes: u64,
    pub refresh_failures: u64,

    // Identity wrappers
    pub wrappers_created: u64,
    pub wrappers_reused: u64,

    // Streaming
    pub streams_written: u64,
    pub items_streamed: u64,
}

///
/// TypeCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeCounters {
    pub links_encoded: u64,
    pub links_decoded: u64,
    pub links_rejected: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
}

impl TypeCounters {
    const fn activity(&self) -> u64 {
        self.links_encoded
            .saturating_add(self.links_decoded)
            .saturating_add(self.links_rejected)
            .saturating_add(self.refreshes)
    }
}

///
/// EventReport
/// Event counters plus per-type summaries ordered by activity.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
    pub type_counters: Vec<(String, TypeCounters)>,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Bump one per-type counter bucket.
pub(crate) fn with_type_mut(state: &mut EventState, record_type: &str, f: impl FnOnce(&mut TypeCounters)) {
    f(state.types.entry(record_type.to_string()).or_default());
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Build a report; a `window_start_ms` newer than the counter window yields
/// an empty report.
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    EVENT_STATE.with(|m| {
        let state = m.borrow();
        if window_start_ms.is_some_and(|start| start > state.since_ms) {
            return EventReport::default();
        }

        let mut type_counters: Vec<(String, TypeCounters)> = state
            .types
            .iter()
            .map(|(name, counters)| (name.clone(), counters.clone()))
            .collect();
        type_counters.sort_by(|(left_name, left), (right_name, right)| {
            right
                .activity()
                .cmp(&left.activity())
                .then_with(|| left_name.cmp(right_name))
        });

        EventReport {
            counters: Some(state.clone()),
            type_counters,
        }
    })
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}
