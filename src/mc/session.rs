//! The checker's view of the application under test: restoring to the
//! initial state, listing enabled actors, and executing one actor's next
//! simcall (spec §4.5 steps 1-4). Grounded on `simgrid/mc`'s notion of a
//! "session" driving the real application process through the checker.

// Layer 1: Standard library imports
use std::any::Any;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::mc::state::Snapshot;
use crate::util::Pid;

/// Bridges the liveness checker to whatever drives the simulated
/// application (in practice, a `Maestro` wrapped by the caller). The
/// checker never touches `Maestro` directly: it only sees this trait,
/// keeping the search engine independent of the kernel's concrete state
/// representation.
pub trait CheckerModel: Send {
    /// Reset the application to its initial state (spec §4.5 step 1).
    fn restore_initial_state(&mut self);

    /// Actors with an enabled (runnable) simcall from the current state
    /// (spec §4.5 step 2 — the interleave set for this pair).
    fn enabled(&self) -> Vec<Pid>;

    /// Advance the application by running exactly one simcall for
    /// `transition`, returning the opaque post-state (for proposition
    /// evaluation) and its snapshot (for equal-range dedup).
    fn execute(&mut self, transition: Pid) -> (Box<dyn Any>, Snapshot);

    /// The current state and snapshot without advancing, used to seed the
    /// root pair before any transition has executed.
    fn current(&self) -> (Box<dyn Any>, Snapshot);

    /// Optional fast path: jump directly to a previously captured
    /// snapshot instead of replaying from the initial state. Models that
    /// don't support direct restore return `false` and the checker falls
    /// back to full re-execution.
    fn restore_snapshot(&mut self, _snapshot: &Snapshot) -> bool {
        false
    }
}

/// Thin wrapper around a `CheckerModel`, kept so `LivenessChecker` talks
/// to one named thing instead of a bare trait object.
pub struct Session<M: CheckerModel> {
    model: M,
}

impl<M: CheckerModel> Session<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn restore_initial_state(&mut self) {
        self.model.restore_initial_state();
    }

    pub fn enabled(&self) -> Vec<Pid> {
        self.model.enabled()
    }

    pub fn execute(&mut self, transition: Pid) -> (Box<dyn Any>, Snapshot) {
        self.model.execute(transition)
    }

    pub fn current(&self) -> (Box<dyn Any>, Snapshot) {
        self.model.current()
    }

    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) -> bool {
        self.model.restore_snapshot(snapshot)
    }

    /// Replay the recorded path from scratch, used when `restore_snapshot`
    /// is unsupported (spec §4.5: "replay via checkpoint or full
    /// re-execution").
    pub fn replay(&mut self, path: &[Pid]) {
        self.restore_initial_state();
        for pid in path {
            self.model.execute(*pid);
        }
    }
}
