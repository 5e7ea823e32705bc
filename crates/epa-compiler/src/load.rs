use epa_ir::types::{AutomatonSpec, TransitionDecl, TransitionTag};
use epa_model::{Automaton, ModelError, State, Transition};
use epa_vif::Introspection;
use tracing::debug;

use crate::validate::{check_introspection, validate_spec, ConfigError, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Validation(Vec<ValidationError>),

    #[error("Configuration errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Config(Vec<ConfigError>),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Load a declared automaton and check it against the class under test.
pub fn load_automaton<I>(spec: &AutomatonSpec, intro: &I) -> Result<Automaton, LoadError>
where
    I: Introspection + ?Sized,
{
    // 1. Structural validation
    validate_spec(spec).map_err(LoadError::Validation)?;

    // 2. Cross-check against the class under test
    check_introspection(spec, intro).map_err(LoadError::Config)?;

    // 3. Materialize
    let automaton = build(spec)?;
    debug!(
        automaton = %spec.name,
        states = automaton.states().len(),
        actions = automaton.actions().len(),
        transitions = automaton.transitions().len(),
        "loaded automaton"
    );
    Ok(automaton)
}

/// Build an automaton from a specification without consulting a class.
/// Used for mined automata read back from disk.
pub fn automaton_from_spec(spec: &AutomatonSpec) -> Result<Automaton, LoadError> {
    validate_spec(spec).map_err(LoadError::Validation)?;
    build(spec)
}

fn build(spec: &AutomatonSpec) -> Result<Automaton, LoadError> {
    // validate_spec guarantees exactly one initial state
    let initial = spec
        .initial_states()
        .next()
        .map(|s| State::named(&s.name))
        .ok_or(LoadError::Validation(vec![ValidationError::InitialStateCount { count: 0 }]))?;
    let states = spec.states.iter().map(|s| State::named(&s.name));
    let actions = spec.actions.iter().cloned();
    let transitions = spec.transitions.iter().map(transition_from_decl);
    Ok(Automaton::new(initial, states, actions, transitions)?)
}

fn transition_from_decl(decl: &TransitionDecl) -> Transition {
    let origin = State::named(&decl.origin);
    let destination = State::named(&decl.destination);
    match (decl.kind, &decl.failure) {
        (TransitionTag::Exceptional, Some(failure)) => {
            Transition::exceptional(origin, &decl.action, destination, failure)
        }
        _ => Transition::normal(origin, &decl.action, destination),
    }
}
