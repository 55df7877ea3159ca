//! Büchi property automaton (spec §6 consumed property layer, §8
//! component C8): states, transitions, label expressions over
//! propositional symbols evaluated against the application.

// Layer 1: Standard library imports
use std::any::Any;
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// `{initial=-1, normal=0, accepting=1}` in the original's encoding;
/// represented here as a proper enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatonState {
    Initial,
    Normal,
    Accepting,
}

/// A boolean expression over named propositions.
#[derive(Debug, Clone)]
pub enum Label {
    Prop(String),
    And(Box<Label>, Box<Label>),
    Or(Box<Label>, Box<Label>),
    Not(Box<Label>),
    True,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub label: Label,
    pub dst: usize,
}

/// A named proposition with an evaluator callback that reads the opaque
/// application state and returns 0/1 (spec §6: "an evaluator callback that
/// reads simulated memory and returns 0/1").
pub struct PropositionalSymbol {
    pub name: String,
    evaluator: Box<dyn Fn(&dyn Any) -> bool + Send + Sync>,
}

impl PropositionalSymbol {
    pub fn new(
        name: impl Into<String>,
        evaluator: impl Fn(&dyn Any) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            evaluator: Box::new(evaluator),
        }
    }

    pub fn evaluate(&self, state: &dyn Any) -> bool {
        (self.evaluator)(state)
    }
}

/// A Büchi automaton over propositions evaluated against application state.
pub struct Automaton {
    states: Vec<AutomatonState>,
    transitions: Vec<Vec<Transition>>,
    initial: usize,
    symbols: Vec<PropositionalSymbol>,
}

impl Automaton {
    pub fn new(
        states: Vec<AutomatonState>,
        transitions: Vec<Vec<Transition>>,
        initial: usize,
        symbols: Vec<PropositionalSymbol>,
    ) -> Self {
        assert_eq!(states.len(), transitions.len());
        Self {
            states,
            transitions,
            initial,
            symbols,
        }
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn is_accepting(&self, idx: usize) -> bool {
        matches!(self.states[idx], AutomatonState::Accepting)
    }

    /// Evaluate every propositional symbol against `state`, keyed by name.
    pub fn evaluate_propositions(&self, state: &dyn Any) -> HashMap<String, bool> {
        self.symbols
            .iter()
            .map(|s| (s.name.clone(), s.evaluate(state)))
            .collect()
    }

    fn label_holds(&self, label: &Label, props: &HashMap<String, bool>) -> bool {
        match label {
            Label::True => true,
            Label::Prop(name) => *props.get(name).unwrap_or(&false),
            Label::And(a, b) => self.label_holds(a, props) && self.label_holds(b, props),
            Label::Or(a, b) => self.label_holds(a, props) || self.label_holds(b, props),
            Label::Not(a) => !self.label_holds(a, props),
        }
    }

    /// Destination states of every outgoing transition from `idx` whose
    /// label evaluates true under `props` (spec §4.5 step 5).
    pub fn successors(&self, idx: usize, props: &HashMap<String, bool>) -> Vec<usize> {
        self.transitions[idx]
            .iter()
            .filter(|t| self.label_holds(&t.label, props))
            .map(|t| t.dst)
            .collect()
    }
}
