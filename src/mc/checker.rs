//! Nested depth-first search over the (app-state × automaton-state)
//! product graph (spec §4.5, component C7). Detects acceptance cycles —
//! a liveness violation — and reports a counter-example trace when found.
//! Grounded on `simgrid/mc`'s `LivenessChecker`: an explicit stack of
//! pairs, two sorted sets (visited, acceptance) kept ordered by
//! `(actors_count, heap_bytes_used)` for equal-range search, and eviction
//! of the oldest visited pair once a configured bound is exceeded.

// Layer 1: Standard library imports
// (none beyond what pair/state/automaton bring)

// Layer 2: Third-party crate imports
use tracing::{debug, info, warn};

// Layer 3: Internal module imports
use crate::error::KernelError;
use crate::mc::automaton::Automaton;
use crate::mc::pair::{AcceptancePair, Pair, VisitedPair};
use crate::mc::session::{CheckerModel, Session};
use crate::mc::state::Snapshot;

/// Bounds and knobs the checker is configured with (spec §6's
/// `max-visited-states` / `checkpoint-interval`).
#[derive(Debug, Clone, Copy)]
pub struct CheckerLimits {
    pub max_visited: Option<usize>,
}

impl Default for CheckerLimits {
    fn default() -> Self {
        Self { max_visited: None }
    }
}

pub struct LivenessChecker<M: CheckerModel> {
    session: Session<M>,
    automaton: Automaton,
    stack: Vec<Pair>,
    visited: Vec<VisitedPair>,
    acceptance: Vec<AcceptancePair>,
    limits: CheckerLimits,
    next_pair_id: u64,
    expanded_pairs_count: u64,
}

impl<M: CheckerModel> LivenessChecker<M> {
    pub fn new(session: Session<M>, automaton: Automaton, limits: CheckerLimits) -> Self {
        Self {
            session,
            automaton,
            stack: Vec::new(),
            visited: Vec::new(),
            acceptance: Vec::new(),
            limits,
            next_pair_id: 0,
            expanded_pairs_count: 0,
        }
    }

    /// Runs the nested DFS to completion. `Ok(())` means the property
    /// holds on every explored interleaving; `Err(KernelError::LivenessViolation)`
    /// carries a counter-example trace.
    pub fn run(&mut self) -> Result<(), KernelError> {
        self.session.restore_initial_state();
        let (state, snapshot) = self.session.current();
        let propositions = self.automaton.evaluate_propositions(state.as_ref());
        let initial = self.make_pair(self.automaton.initial(), propositions, snapshot, 0, false, Vec::new());
        self.stack.push(initial);

        while let Some(mut pair) = self.stack.pop() {
            if pair.requests == 0 {
                self.backtrack(&pair);
                continue;
            }

            if !pair.exploration_started {
                pair.exploration_started = true;

                if self.automaton.is_accepting(pair.automaton_state) {
                    if let Some(violation) = self.insert_acceptance_pair(&pair) {
                        return Err(violation);
                    }
                }

                if self.insert_visited_pair(&pair) {
                    debug!(pair_id = pair.id, "pair already visited, pruning branch");
                    pair.requests = 0;
                    self.stack.push(pair);
                    continue;
                }
            }

            let pid = pair.next_transition();
            pair.requests -= 1;
            let depth = pair.depth + 1;
            let search_cycle = pair.search_cycle || self.automaton.is_accepting(pair.automaton_state);
            let mut executed = pair.executed.clone();
            executed.push(pid);

            // Replay up to `pair` then run one more transition, since the
            // stack frame below may have mutated shared application state
            // since `pair` was first expanded.
            if !self.session.restore_snapshot(&pair.snapshot) {
                self.session.replay(&pair.executed);
            }
            let (state, snapshot) = self.session.execute(pid);
            let propositions = self.automaton.evaluate_propositions(state.as_ref());
            let successors = self.automaton.successors(pair.automaton_state, &propositions);

            self.stack.push(pair);
            for dst in successors {
                let child = self.make_pair(dst, propositions.clone(), snapshot.clone(), depth, search_cycle, executed.clone());
                self.stack.push(child);
            }
        }

        info!(
            expanded = self.expanded_pairs_count,
            visited = self.visited.len(),
            "liveness search exhausted the interleave space, property holds"
        );
        Ok(())
    }

    fn make_pair(
        &mut self,
        automaton_state: usize,
        propositions: std::collections::HashMap<String, bool>,
        snapshot: Snapshot,
        depth: usize,
        search_cycle: bool,
        executed: Vec<crate::util::Pid>,
    ) -> Pair {
        self.expanded_pairs_count += 1;
        self.next_pair_id += 1;
        let interleave = self.session.enabled();
        Pair {
            id: self.next_pair_id,
            automaton_state,
            propositions,
            snapshot,
            depth,
            search_cycle,
            exploration_started: false,
            requests: interleave.len(),
            interleave,
            executed,
        }
    }

    fn equal_range<'a>(list: &'a [VisitedPair], snapshot: &Snapshot) -> std::ops::Range<usize> {
        let key = snapshot.bucket_key();
        let start = list.partition_point(|v| v.snapshot.bucket_key() < key);
        let end = list.partition_point(|v| v.snapshot.bucket_key() <= key);
        start..end
    }

    fn insert_sorted(list: &mut Vec<VisitedPair>, item: VisitedPair) {
        let key = item.snapshot.bucket_key();
        let pos = list.partition_point(|v| v.snapshot.bucket_key() <= key);
        list.insert(pos, item);
    }

    /// Returns `true` if an equal pair was already visited (branch should
    /// be pruned).
    fn insert_visited_pair(&mut self, pair: &Pair) -> bool {
        let range = Self::equal_range(&self.visited, &pair.snapshot);
        if self.visited[range].iter().any(|v| v.matches(pair)) {
            return true;
        }
        self.next_pair_id += 1;
        let record = VisitedPair {
            num: self.next_pair_id,
            automaton_state: pair.automaton_state,
            propositions: pair.propositions.clone(),
            snapshot: pair.snapshot.clone(),
            other_num: 0,
        };
        Self::insert_sorted(&mut self.visited, record);
        self.evict_if_over_budget();
        false
    }

    fn evict_if_over_budget(&mut self) {
        let Some(max) = self.limits.max_visited else {
            return;
        };
        while self.visited.len() > max {
            if let Some((idx, _)) = self.visited.iter().enumerate().min_by_key(|(_, v)| v.num) {
                warn!(evicted = self.visited[idx].num, "visited-pair budget exceeded, evicting oldest");
                self.visited.remove(idx);
            } else {
                break;
            }
        }
    }

    /// Returns `Some(violation)` if an equal pair is already on the
    /// acceptance set and the search already passed through an acceptance
    /// state since then — an accepting cycle, i.e. a liveness violation.
    fn insert_acceptance_pair(&mut self, pair: &Pair) -> Option<KernelError> {
        let range = Self::equal_range(&self.acceptance, &pair.snapshot);
        if pair.search_cycle && self.acceptance[range].iter().any(|v| v.matches(pair)) {
            let trace = pair
                .executed
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Some(KernelError::LivenessViolation {
                trace,
                depth: pair.depth,
            });
        }
        self.next_pair_id += 1;
        let record = AcceptancePair {
            num: self.next_pair_id,
            automaton_state: pair.automaton_state,
            propositions: pair.propositions.clone(),
            snapshot: pair.snapshot.clone(),
            other_num: 0,
        };
        Self::insert_sorted(&mut self.acceptance, record);
        None
    }

    fn backtrack(&mut self, pair: &Pair) {
        if self.automaton.is_accepting(pair.automaton_state) {
            let range = Self::equal_range(&self.acceptance, &pair.snapshot);
            if let Some(pos) = self.acceptance[range.clone()].iter().position(|v| v.matches(pair)) {
                self.acceptance.remove(range.start + pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::automaton::{AutomatonState, Label, PropositionalSymbol, Transition};
    use crate::util::Pid;
    use std::any::Any;

    /// A single-actor model whose counter cycles modulo 4, so its
    /// snapshot fingerprints repeat and the visited set bounds the
    /// search; "always eventually even" holds on every cycle.
    struct CounterModel {
        counter: i64,
        pid_a: Pid,
    }

    impl CheckerModel for CounterModel {
        fn restore_initial_state(&mut self) {
            self.counter = 0;
        }

        fn enabled(&self) -> Vec<Pid> {
            vec![self.pid_a]
        }

        fn execute(&mut self, _transition: Pid) -> (Box<dyn Any>, Snapshot) {
            self.counter = (self.counter + 1) % 4;
            let snapshot = Snapshot::new(self.counter as u64, 1, 0);
            (Box::new(self.counter % 2 == 0), snapshot)
        }

        fn current(&self) -> (Box<dyn Any>, Snapshot) {
            let snapshot = Snapshot::new(self.counter as u64, 1, 0);
            (Box::new(self.counter % 2 == 0), snapshot)
        }
    }

    /// An automaton whose accepting state self-loops forever once entered:
    /// reaching it twice with identical state is, by construction, an
    /// accepting cycle.
    fn stuck_forever_automaton() -> Automaton {
        let symbols = vec![PropositionalSymbol::new("stuck", |s: &dyn Any| {
            *s.downcast_ref::<bool>().unwrap_or(&false)
        })];
        let transitions = vec![
            vec![Transition { label: Label::Prop("stuck".into()), dst: 1 }],
            vec![Transition { label: Label::True, dst: 1 }],
        ];
        Automaton::new(
            vec![AutomatonState::Normal, AutomatonState::Accepting],
            transitions,
            0,
            symbols,
        )
    }

    #[test]
    fn no_accepting_state_means_property_holds() {
        let model = CounterModel {
            counter: 0,
            pid_a: Pid::MAESTRO,
        };
        let session = Session::new(model);
        // Single, never-accepting automaton state: whatever the
        // application does, there is nothing to violate.
        let automaton = Automaton::new(
            vec![AutomatonState::Normal],
            vec![vec![Transition { label: Label::True, dst: 0 }]],
            0,
            Vec::new(),
        );
        let limits = CheckerLimits { max_visited: Some(16) };
        let mut checker = LivenessChecker::new(session, automaton, limits);
        assert!(checker.run().is_ok());
    }

    #[test]
    fn application_that_never_changes_is_a_liveness_violation() {
        struct StuckModel;
        impl CheckerModel for StuckModel {
            fn restore_initial_state(&mut self) {}
            fn enabled(&self) -> Vec<Pid> {
                vec![Pid::MAESTRO]
            }
            fn execute(&mut self, _t: Pid) -> (Box<dyn Any>, Snapshot) {
                // identical fingerprint on every step: the application
                // never progresses past this point.
                (Box::new(true), Snapshot::new(1, 1, 0))
            }
            fn current(&self) -> (Box<dyn Any>, Snapshot) {
                (Box::new(true), Snapshot::new(1, 1, 0))
            }
        }

        let session = Session::new(StuckModel);
        let automaton = stuck_forever_automaton();
        let mut checker = LivenessChecker::new(session, automaton, CheckerLimits::default());
        let result = checker.run();
        assert!(matches!(result, Err(KernelError::LivenessViolation { .. })));
    }
}
