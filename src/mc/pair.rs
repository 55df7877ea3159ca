//! (app-state × automaton-state) pairs, the unit the nested-DFS search
//! pushes and pops (spec §3, §4.5). `Pair` is the live, mutable DFS-stack
//! frame; `VisitedPair`/`AcceptancePair` are the small, cheaply-cloned
//! records kept in the two sorted sets used for equal-range dedup.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::mc::state::Snapshot;
use crate::util::Pid;

/// A DFS-stack frame: one (app-state, automaton-state) pair together with
/// the actors still left to interleave from it and the path that reached
/// it, for counter-example reporting.
#[derive(Debug, Clone)]
pub struct Pair {
    pub id: u64,
    pub automaton_state: usize,
    pub propositions: HashMap<String, bool>,
    pub snapshot: Snapshot,
    pub depth: usize,
    /// True once this pair (or an ancestor since the last acceptance
    /// state) has passed through an accepting automaton state — the
    /// "nested" part of nested DFS.
    pub search_cycle: bool,
    pub exploration_started: bool,
    /// Actors enabled to run from this pair, most-recent-first; `requests`
    /// counts how many remain unexplored.
    pub interleave: Vec<Pid>,
    pub requests: usize,
    /// The sequence of actor choices that reached this pair, for
    /// counter-example traces and replay.
    pub executed: Vec<Pid>,
}

impl Pair {
    pub fn next_transition(&self) -> Pid {
        self.interleave[self.interleave.len() - self.requests]
    }
}

/// A small record of a pair already fully expanded, kept in the visited
/// set so the search never re-expands an equivalent pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitedPair {
    pub num: u64,
    pub automaton_state: usize,
    pub propositions: HashMap<String, bool>,
    pub snapshot: Snapshot,
    /// The `num` of the pair this one was found equal to, 0 for the
    /// original insertion.
    pub other_num: u64,
}

impl VisitedPair {
    pub fn matches(&self, other: &Pair) -> bool {
        self.automaton_state == other.automaton_state
            && self.propositions == other.propositions
            && self.snapshot == other.snapshot
    }
}

/// Same shape as `VisitedPair`; kept as a distinct alias since the
/// acceptance set is semantically a different collection (spec §3).
pub type AcceptancePair = VisitedPair;
