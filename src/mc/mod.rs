//! Liveness model checking: nested depth-first search over the
//! (app-state × Büchi-automaton-state) product graph (spec §4.5, §8
//! components C6-C8). Grounded on `simgrid/mc`'s `LivenessChecker`,
//! `VisitedState`/`Pair`, and property automaton.

pub mod automaton;
pub mod checker;
pub mod pair;
pub mod session;
pub mod state;

pub use automaton::{Automaton, AutomatonState, Label, PropositionalSymbol, Transition};
pub use checker::{CheckerLimits, LivenessChecker};
pub use pair::{AcceptancePair, Pair, VisitedPair};
pub use session::{CheckerModel, Session};
pub use state::Snapshot;
