use std::collections::HashSet;

use epa_ir::types::{AutomatonSpec, TransitionTag, INVALID_STATE_LABEL};
use epa_vif::Introspection;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Expected exactly one initial state, found {count}")]
    InitialStateCount { count: usize },

    #[error("Duplicate state '{state}'")]
    DuplicateState { state: String },

    #[error("Duplicate action '{action}'")]
    DuplicateAction { action: String },

    #[error("State name '{state}' is reserved for the invalid-object sentinel")]
    ReservedStateName { state: String },

    #[error("Transition #{index} references undeclared state '{state}'")]
    DanglingState { index: usize, state: String },

    #[error("Transition #{index} references undeclared action '{action}'")]
    DanglingAction { index: usize, action: String },

    #[error("Exceptional transition #{index} has no failure kind")]
    MissingFailure { index: usize },

    #[error("Normal transition #{index} carries failure kind '{failure}'")]
    UnexpectedFailure { index: usize, failure: String },
}

/// Configuration errors: the automaton does not match the class under test.
/// Fatal, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("State '{state}' has no state predicate in class '{class}'")]
    MissingStatePredicate { class: String, state: String },

    #[error("Action '{action}' has no callable operation in class '{class}'")]
    MissingAction { class: String, action: String },

    #[error("Action '{action}' has no precondition in class '{class}'")]
    MissingPrecondition { class: String, action: String },

    #[error("Precondition '{action}' has no matching action in class '{class}'")]
    MissingActionForPrecondition { class: String, action: String },

    #[error("Class '{class}' declares no actions")]
    NoActions { class: String },
}

pub fn validate_spec(spec: &AutomatonSpec) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    validate_states(spec, &mut errors);
    validate_actions(spec, &mut errors);
    validate_transitions(spec, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check the initial-state count, duplicate names and the reserved label.
fn validate_states(spec: &AutomatonSpec, errors: &mut Vec<ValidationError>) {
    let count = spec.initial_states().count();
    if count != 1 {
        errors.push(ValidationError::InitialStateCount { count });
    }
    let mut seen = HashSet::new();
    for state in &spec.states {
        if state.name == INVALID_STATE_LABEL {
            errors.push(ValidationError::ReservedStateName {
                state: state.name.clone(),
            });
        }
        if !seen.insert(state.name.as_str()) {
            errors.push(ValidationError::DuplicateState {
                state: state.name.clone(),
            });
        }
    }
}

fn validate_actions(spec: &AutomatonSpec, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for action in &spec.actions {
        if !seen.insert(action.as_str()) {
            errors.push(ValidationError::DuplicateAction {
                action: action.clone(),
            });
        }
    }
}

/// Check endpoint/action references and that failure kinds match the tag.
fn validate_transitions(spec: &AutomatonSpec, errors: &mut Vec<ValidationError>) {
    let states: HashSet<&str> = spec.states.iter().map(|s| s.name.as_str()).collect();
    let actions: HashSet<&str> = spec.actions.iter().map(String::as_str).collect();

    for (index, t) in spec.transitions.iter().enumerate() {
        for endpoint in [&t.origin, &t.destination] {
            if !states.contains(endpoint.as_str()) {
                errors.push(ValidationError::DanglingState {
                    index,
                    state: endpoint.clone(),
                });
            }
        }
        if !actions.contains(t.action.as_str()) {
            errors.push(ValidationError::DanglingAction {
                index,
                action: t.action.clone(),
            });
        }
        match (t.kind, &t.failure) {
            (TransitionTag::Exceptional, None) => {
                errors.push(ValidationError::MissingFailure { index });
            }
            (TransitionTag::Normal, Some(failure)) => {
                errors.push(ValidationError::UnexpectedFailure {
                    index,
                    failure: failure.clone(),
                });
            }
            _ => {}
        }
    }
}

/// Cross-check a specification against the class under test: every
/// non-initial state needs a state predicate and every action a callable
/// operation.
pub fn check_introspection<I>(spec: &AutomatonSpec, intro: &I) -> Result<(), Vec<ConfigError>>
where
    I: Introspection + ?Sized,
{
    let mut errors = Vec::new();
    let class = intro.class_name().to_string();

    for state in spec.states.iter().filter(|s| !s.initial) {
        if !intro.has_state_predicate(&state.name) {
            errors.push(ConfigError::MissingStatePredicate {
                class: class.clone(),
                state: state.name.clone(),
            });
        }
    }

    let catalogue = intro.action_catalogue();
    for action in &spec.actions {
        let callable = catalogue.get(action).is_some_and(|ops| !ops.is_empty());
        if !callable {
            errors.push(ConfigError::MissingAction {
                class: class.clone(),
                action: action.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
