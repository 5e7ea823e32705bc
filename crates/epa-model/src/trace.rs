//! Per-instance execution traces with truncation on the invalid state.

use serde::{Deserialize, Serialize};

use crate::automaton::Transition;

/// Two transitions observed back to back within one trace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdjacentPair {
    pub first: Transition,
    pub second: Transition,
}

impl AdjacentPair {
    pub fn new(first: Transition, second: Transition) -> Self {
        Self { first, second }
    }
}

impl std::fmt::Display for AdjacentPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ; [{}]", self.first, self.second)
    }
}

/// Scanning phase of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    /// A transition into the invalid state was recorded; nothing further is accepted.
    Truncated,
}

/// Ordered transitions of one object instance in one execution.
///
/// Invariant: at most one degenerate transition, and only as the last element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Trace {
    transitions: Vec<Transition>,
}

impl Trace {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Build a trace, dropping everything after the first degenerate transition.
    pub fn from_transitions(transitions: impl IntoIterator<Item = Transition>) -> Self {
        let mut trace = Self::new();
        for t in transitions {
            if !trace.record(t) {
                break;
            }
        }
        trace
    }

    /// Append a transition. Returns `false` when the trace is already
    /// truncated, in which case the transition is discarded.
    pub fn record(&mut self, transition: Transition) -> bool {
        if self.scan_state() == ScanState::Truncated {
            return false;
        }
        self.transitions.push(transition);
        true
    }

    pub fn scan_state(&self) -> ScanState {
        match self.transitions.last() {
            Some(t) if t.is_degenerate() => ScanState::Truncated,
            _ => ScanState::Scanning,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.scan_state() == ScanState::Truncated
    }

    /// Every recorded transition, including a trailing degenerate one.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The transitions that may contribute to coverage.
    pub fn coverable(&self) -> &[Transition] {
        match self.scan_state() {
            ScanState::Truncated => &self.transitions[..self.transitions.len() - 1],
            ScanState::Scanning => &self.transitions,
        }
    }

    /// Sliding window of two over the coverable prefix.
    pub fn adjacent_pairs(&self) -> impl Iterator<Item = AdjacentPair> + '_ {
        self.coverable()
            .windows(2)
            .map(|w| AdjacentPair::new(w[0].clone(), w[1].clone()))
    }

    /// Exceptional transitions of the coverable prefix.
    pub fn exceptional(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.coverable().iter().filter(|t| t.is_exceptional())
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
