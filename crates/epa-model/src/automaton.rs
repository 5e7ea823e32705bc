//! Immutable automaton model: states, actions, tagged transitions.
//!
//! Structural equality throughout. Two transitions with the same origin,
//! action and destination are still distinct when their tags differ, or
//! when both are exceptional with different failure kinds.

use std::collections::BTreeSet;
use std::fmt;

use epa_ir::types::INVALID_STATE_LABEL;
use serde::{Deserialize, Serialize};

/// An automaton state, identified by its canonical name.
///
/// `Invalid` is the runtime sentinel for "the object reached an illegal or
/// crashed condition". It never belongs to an [`Automaton`]'s state set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Named(String),
    Invalid,
}

impl State {
    pub fn named(name: impl Into<String>) -> Self {
        State::Named(name.into())
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, State::Invalid)
    }

    pub fn name(&self) -> &str {
        match self {
            State::Named(name) => name,
            State::Invalid => INVALID_STATE_LABEL,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normal or exceptional outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionKind {
    Normal,
    Exceptional { failure: String },
}

/// One edge of the automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    pub origin: State,
    pub action: String,
    pub destination: State,
    pub kind: TransitionKind,
}

impl Transition {
    pub fn normal(origin: State, action: impl Into<String>, destination: State) -> Self {
        Self {
            origin,
            action: action.into(),
            destination,
            kind: TransitionKind::Normal,
        }
    }

    pub fn exceptional(
        origin: State,
        action: impl Into<String>,
        destination: State,
        failure: impl Into<String>,
    ) -> Self {
        Self {
            origin,
            action: action.into(),
            destination,
            kind: TransitionKind::Exceptional {
                failure: failure.into(),
            },
        }
    }

    /// A transition into the invalid sentinel. Evaluators never count these.
    pub fn is_degenerate(&self) -> bool {
        self.destination.is_invalid()
    }

    pub fn is_exceptional(&self) -> bool {
        matches!(self.kind, TransitionKind::Exceptional { .. })
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.kind {
            TransitionKind::Normal => None,
            TransitionKind::Exceptional { failure } => Some(failure),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TransitionKind::Normal => write!(
                f,
                "{} --{}--> {}",
                self.origin, self.action, self.destination
            ),
            TransitionKind::Exceptional { failure } => write!(
                f,
                "{} --{}!{}--> {}",
                self.origin, self.action, failure, self.destination
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("The invalid-state sentinel cannot be a member of the state set")]
    InvalidStateMember,

    #[error("Initial state '{state}' is not a declared state")]
    UnknownInitialState { state: String },

    #[error("Transition '{transition}' references undeclared state '{state}'")]
    DanglingState { transition: String, state: String },

    #[error("Transition '{transition}' references undeclared action '{action}'")]
    UnknownAction { transition: String, action: String },
}

/// A validated automaton.
///
/// Invariants (checked by [`Automaton::new`]): every transition endpoint is
/// a member of `states`, every transition action is a member of `actions`,
/// the initial state is a member of `states`, and `State::Invalid` is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automaton {
    states: BTreeSet<State>,
    actions: BTreeSet<String>,
    transitions: BTreeSet<Transition>,
    initial: State,
}

impl Automaton {
    pub fn new(
        initial: State,
        states: impl IntoIterator<Item = State>,
        actions: impl IntoIterator<Item = String>,
        transitions: impl IntoIterator<Item = Transition>,
    ) -> Result<Self, ModelError> {
        let states: BTreeSet<State> = states.into_iter().collect();
        let actions: BTreeSet<String> = actions.into_iter().collect();
        let transitions: BTreeSet<Transition> = transitions.into_iter().collect();

        if states.contains(&State::Invalid) {
            return Err(ModelError::InvalidStateMember);
        }
        if !states.contains(&initial) {
            return Err(ModelError::UnknownInitialState {
                state: initial.to_string(),
            });
        }
        for t in &transitions {
            for endpoint in [&t.origin, &t.destination] {
                if !states.contains(endpoint) {
                    return Err(ModelError::DanglingState {
                        transition: t.to_string(),
                        state: endpoint.to_string(),
                    });
                }
            }
            if !actions.contains(&t.action) {
                return Err(ModelError::UnknownAction {
                    transition: t.to_string(),
                    action: t.action.clone(),
                });
            }
        }

        Ok(Self {
            states,
            actions,
            transitions,
            initial,
        })
    }

    pub fn states(&self) -> &BTreeSet<State> {
        &self.states
    }

    pub fn actions(&self) -> &BTreeSet<String> {
        &self.actions
    }

    pub fn transitions(&self) -> &BTreeSet<Transition> {
        &self.transitions
    }

    pub fn initial_state(&self) -> &State {
        &self.initial
    }

    pub fn contains_action(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    pub fn contains_transition(&self, transition: &Transition) -> bool {
        self.transitions.contains(transition)
    }

    /// `S * A * S`: the number of distinct (origin, action, destination)
    /// triples over this automaton's vocabulary.
    pub fn edge_space(&self) -> u128 {
        let s = self.states.len() as u128;
        let a = self.actions.len() as u128;
        s.saturating_mul(a).saturating_mul(s)
    }
}
