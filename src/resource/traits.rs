//! The consumed contract to resource models (spec §6): `Action` objects with
//! `finish(state)` and a completion callback.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::activity::{Activity, ActivityOutcome};
use crate::util::HostId;

/// One completed activity, as reported by the resource model.
pub struct ResourceEvent {
    pub activity: Arc<Activity>,
    pub outcome: ActivityOutcome,
    pub at_millis: u64,
}

/// What maestro asks of the "Action" collaborator spec §6 describes: decide
/// when blocking activities complete and supply elapsed simulated time.
///
/// Out of scope: realistic CPU/network/disk contention. A model only needs
/// to honor "later schedules complete no earlier than their scheduled time"
/// and "a failed host fails everything scheduled on it".
pub trait ResourceModel: Send {
    fn now_millis(&self) -> u64;

    fn schedule_exec(&mut self, activity: Arc<Activity>, host: HostId, flops: f64);

    fn schedule_sleep(&mut self, activity: Arc<Activity>, host: HostId, duration: Duration);

    /// Advance to the next scheduled event and report its completion, or
    /// `None` if nothing is scheduled (spec §4.4 step 3: "ask the resource
    /// model to advance time to the next event").
    fn advance(&mut self) -> Option<ResourceEvent>;

    /// Fail every activity scheduled against `host`, returning their
    /// outcomes so the caller can drain `simcalls` on each (spec §3: "host
    /// off forcefully fails all its resident activities").
    fn fail_host(&mut self, host: &HostId) -> Vec<ResourceEvent>;

    fn is_empty(&self) -> bool;
}
