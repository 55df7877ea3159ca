//! Lifecycle bookkeeping layered on top of [`super::handle::ActorHandle`]'s
//! functional state (`finished`/`suspended`/`daemon`) — tracked separately
//! so logging and the restart scenario (spec §8 end-to-end scenario 4) have
//! a place to read "what happened and when" without re-deriving it from the
//! functional flags.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY

// Layer 3: Internal module imports
// (none)

/// Coarse lifecycle phase, distinct from [`crate::activity::ActivityState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorLifecycleState {
    Created,
    Running,
    Suspended,
    Finished,
}

impl Default for ActorLifecycleState {
    fn default() -> Self {
        Self::Created
    }
}

impl ActorLifecycleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// State + timestamp + restart-count tracker for one actor.
#[derive(Debug, Clone)]
pub struct ActorLifecycle {
    pub state: ActorLifecycleState,
    pub last_transition: DateTime<Utc>,
    pub restart_count: u32,
}

impl ActorLifecycle {
    pub fn new() -> Self {
        Self {
            state: ActorLifecycleState::Created,
            last_transition: Utc::now(), // §3.2
            restart_count: 0,
        }
    }

    pub fn transition_to(&mut self, state: ActorLifecycleState) {
        self.state = state;
        self.last_transition = Utc::now(); // §3.2
    }

    pub fn is_running(&self) -> bool {
        self.state == ActorLifecycleState::Running
    }
}

impl Default for ActorLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lifecycle_starts_created() {
        let lc = ActorLifecycle::new();
        assert_eq!(lc.state, ActorLifecycleState::Created);
        assert_eq!(lc.restart_count, 0);
    }

    #[test]
    fn transition_updates_state_and_timestamp() {
        let mut lc = ActorLifecycle::new();
        let before = lc.last_transition;
        lc.transition_to(ActorLifecycleState::Running);
        assert!(lc.is_running());
        assert!(lc.last_transition >= before);
    }

    #[test]
    fn finished_is_terminal() {
        assert!(ActorLifecycleState::Finished.is_terminal());
        assert!(!ActorLifecycleState::Running.is_terminal());
    }
}
