//! Blocking units of simulated work: Exec, Comm, Sleep, Sync (spec §3, §4.2,
//! component C2).
//!
//! Grounded on the teacher's `message::envelope` (a tagged payload carrying
//! its own completion bookkeeping) and on `ActorImpl`'s synchro objects in
//! `original_source/ActorImpl.cpp`, which back every blocking actor
//! operation with one of these four variants rather than dynamic-dispatch
//! subclasses (spec §9 "tagged variants replace dynamic-dispatch Activity
//! subclasses").

pub mod kind;
pub mod state;

pub use kind::{ActivityKind, ActivityOutcome, CommDirection};
pub use state::ActivityState;

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use crate::actor::handle::ActorHandle;
use crate::error::KernelError;

/// Identity of an activity, used only for logging/dot-output; activities are
/// otherwise referenced by `Arc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActivityId(u64);

static NEXT_ACTIVITY_ID: AtomicU64 = AtomicU64::new(1);

impl ActivityId {
    fn next() -> Self {
        Self(NEXT_ACTIVITY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A blocking unit of simulated work. `kind` never changes after
/// construction; `state` and `simcalls` are the only mutable fields,
/// matching spec §3's Activity invariants (terminal state is stable,
/// `simcalls` drained on termination).
#[derive(Debug)]
pub struct Activity {
    pub id: ActivityId,
    pub kind: ActivityKind,
    state: Mutex<ActivityState>,
    /// Issuers blocked on this activity; drained by [`Activity::finish`].
    simcalls: Mutex<Vec<Arc<ActorHandle>>>,
    /// True for the placeholder Exec backing a bare `suspend()` (spec §9
    /// open question, resolved: invisible to the checker's interleave scan).
    pub is_internal: bool,
}

impl Activity {
    pub fn new(kind: ActivityKind) -> Arc<Self> {
        Self::new_with_visibility(kind, false)
    }

    pub fn new_internal(kind: ActivityKind) -> Arc<Self> {
        Self::new_with_visibility(kind, true)
    }

    fn new_with_visibility(kind: ActivityKind, is_internal: bool) -> Arc<Self> {
        Arc::new(Self {
            id: ActivityId::next(),
            kind,
            state: Mutex::new(ActivityState::Waiting),
            simcalls: Mutex::new(Vec::new()),
            is_internal,
        })
    }

    pub fn state(&self) -> ActivityState {
        *self.state.lock()
    }

    /// Register an issuer as blocked on this activity until it finishes.
    pub fn wait(&self, issuer: Arc<ActorHandle>) {
        self.simcalls.lock().push(issuer);
    }

    /// `(new) -> RUNNING` (spec §4.2 transition table).
    pub fn start(&self) {
        let mut state = self.state.lock();
        if !state.is_terminal() {
            *state = ActivityState::Running;
        }
    }

    /// `RUNNING -> SUSPENDED`.
    pub fn suspend(&self) {
        let mut state = self.state.lock();
        if *state == ActivityState::Running {
            *state = ActivityState::Suspended;
        }
    }

    /// `SUSPENDED -> RUNNING`.
    pub fn resume(&self) {
        let mut state = self.state.lock();
        if *state == ActivityState::Suspended {
            *state = ActivityState::Running;
        }
    }

    /// Any non-terminal state -> CANCELED. No-op if already terminal (spec
    /// §3: "cancellation from any state yields CANCELED unless already
    /// terminal").
    pub fn cancel(self: &Arc<Self>) -> Vec<Arc<ActorHandle>> {
        let already_terminal = {
            let mut state = self.state.lock();
            let was_terminal = state.is_terminal();
            if !was_terminal {
                *state = ActivityState::Canceled;
            }
            was_terminal
        };
        if already_terminal {
            Vec::new()
        } else {
            self.drain_simcalls()
        }
    }

    /// Called by the resource model on completion. `ok` selects DONE vs
    /// FAILED (spec §4.2: `post(ok)` / `post(err)`).
    pub fn post(self: &Arc<Self>, outcome: ActivityOutcome) -> Vec<Arc<ActorHandle>> {
        {
            let mut state = self.state.lock();
            if state.is_terminal() {
                return Vec::new();
            }
            *state = if outcome.is_ok() {
                ActivityState::Done
            } else {
                ActivityState::Failed
            };
        }
        self.finish(outcome)
    }

    /// The single point that drains `simcalls`: writes the terminal outcome
    /// into every waiting issuer's result slot and returns them so the
    /// caller (maestro) can reschedule them (spec §4.2).
    fn finish(&self, outcome: ActivityOutcome) -> Vec<Arc<ActorHandle>> {
        let issuers = self.drain_simcalls();
        for issuer in &issuers {
            issuer.deliver_activity_outcome(outcome.clone());
        }
        issuers
    }

    fn drain_simcalls(&self) -> Vec<Arc<ActorHandle>> {
        std::mem::take(&mut *self.simcalls.lock())
    }

    pub fn fail(self: &Arc<Self>, err: KernelError) -> Vec<Arc<ActorHandle>> {
        self.post(ActivityOutcome::Err(err))
    }
}
