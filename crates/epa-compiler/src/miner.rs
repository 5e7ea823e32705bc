//! Mining mode: no declared automaton. Normalizing bounds come from the
//! action count, states are labelled by which actions are enabled, and the
//! automaton is inferred from the traces a run accumulated.

use std::collections::BTreeSet;

use epa_model::{Automaton, ModelError, State, Trace};
use epa_vif::{ClassRegistry, Introspection};
use tracing::debug;

use crate::validate::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum MineError {
    #[error("State '{state}' is not an inferred state: its label lists no actions")]
    EmptyLabel { state: String },

    #[error("No non-empty trace to infer an automaton from")]
    NoTraces,

    #[error("Traces disagree on the initial state: '{expected}' vs '{found}'")]
    InconsistentInitialState { expected: String, found: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Check that every action has exactly one precondition and vice versa.
/// Constructors need no precondition. Returns the action count, the union
/// of method and constructor actions.
pub fn check_pairing<I>(intro: &I) -> Result<usize, Vec<ConfigError>>
where
    I: Introspection + ?Sized,
{
    let class = intro.class_name().to_string();
    let catalogue = intro.action_catalogue();
    if catalogue.is_empty() {
        return Err(vec![ConfigError::NoActions { class }]);
    }
    let constructors = intro.constructor_actions();
    let preconditions = intro.precondition_actions();
    let methods: BTreeSet<&String> = catalogue
        .keys()
        .filter(|a| !constructors.contains(*a))
        .collect();

    let mut errors = Vec::new();
    for action in &methods {
        if !preconditions.contains(*action) {
            errors.push(ConfigError::MissingPrecondition {
                class: class.clone(),
                action: (*action).clone(),
            });
        }
    }
    for action in &preconditions {
        if !methods.contains(&action) {
            errors.push(ConfigError::MissingActionForPrecondition {
                class: class.clone(),
                action: action.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(catalogue.len())
    } else {
        Err(errors)
    }
}

// ── Bounds ───────────────────────────────────────────────────────────

/// Theoretical goal-space sizes for a class with `actions` actions.
///
/// Normalizing denominators only; never enumerated. All arithmetic
/// saturates at `u128::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningBounds {
    pub actions: usize,
    /// 2^A: each action independently enabled or disabled.
    pub states: u128,
    /// states * A * states
    pub transitions: u128,
    /// transitions^2 * 2
    pub adjacent_pairs: u128,
    /// transitions * 2
    pub exceptions: u128,
}

impl MiningBounds {
    pub fn from_action_count(actions: usize) -> Self {
        let a = actions as u128;
        let states = if actions < 128 { 1u128 << actions } else { u128::MAX };
        let transitions = states.saturating_mul(a).saturating_mul(states);
        Self {
            actions,
            states,
            transitions,
            adjacent_pairs: transitions.saturating_mul(transitions).saturating_mul(2),
            exceptions: transitions.saturating_mul(2),
        }
    }

    /// Pairing check plus bound computation.
    pub fn from_introspection<I>(intro: &I) -> Result<Self, Vec<ConfigError>>
    where
        I: Introspection + ?Sized,
    {
        let count = check_pairing(intro)?;
        let bounds = Self::from_action_count(count);
        debug!(
            class = intro.class_name(),
            actions = count,
            states = %bounds.states,
            "mining bounds"
        );
        Ok(bounds)
    }
}

// ── State labels ─────────────────────────────────────────────────────

/// Label a state by its action enablement flags: `[a=true, b=false]`,
/// sorted by action name.
pub fn label_state<S: AsRef<str>>(flags: impl IntoIterator<Item = (S, bool)>) -> State {
    let mut entries: Vec<(String, bool)> = flags
        .into_iter()
        .map(|(action, enabled)| (action.as_ref().to_string(), enabled))
        .collect();
    entries.sort();
    let body = entries
        .iter()
        .map(|(action, enabled)| format!("{action}={enabled}"))
        .collect::<Vec<_>>()
        .join(", ");
    State::named(format!("[{body}]"))
}

/// The state of an object on which only the constructor has run.
pub fn constructor_state(constructor: &str) -> State {
    State::named(format!("[{constructor}]"))
}

/// Label a live instance from the registry's preconditions.
pub fn label_instance<T>(registry: &ClassRegistry<T>, instance: &T) -> State {
    label_state(registry.enabled_actions(instance))
}

/// Whether `action` is enabled in an inferred state.
///
/// A single-entry label is the constructor-only state, in which every
/// action counts as enabled. An action absent from the label is disabled.
pub fn is_action_enabled(action: &str, state: &State) -> Result<bool, MineError> {
    let entries = label_entries(state.name());
    if entries.is_empty() || state.is_invalid() {
        return Err(MineError::EmptyLabel {
            state: state.name().to_string(),
        });
    }
    if entries.len() == 1 {
        return Ok(true);
    }
    for entry in entries {
        let (name, value) = entry.split_once('=').unwrap_or((entry, ""));
        if name.trim() == action {
            return Ok(value.trim() == "true");
        }
    }
    Ok(false)
}

/// Split a label body on commas that are not inside parentheses.
fn label_entries(label: &str) -> Vec<&str> {
    let body = label.strip_prefix('[').unwrap_or(label);
    let body = body.strip_suffix(']').unwrap_or(body);

    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                push_entry(&body[start..i], &mut entries);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_entry(&body[start..], &mut entries);
    entries
}

fn push_entry<'a>(raw: &'a str, entries: &mut Vec<&'a str>) {
    let entry = raw.trim();
    if !entry.is_empty() {
        entries.push(entry);
    }
}

// ── Inference ────────────────────────────────────────────────────────

/// Infer an automaton from observed traces.
///
/// States are all non-invalid endpoints, actions all observed actions,
/// transitions all non-degenerate transitions. The initial state is the
/// origin of every non-empty trace's first transition.
pub fn mine<'a>(traces: impl IntoIterator<Item = &'a Trace>) -> Result<Automaton, MineError> {
    let mut initial: Option<State> = None;
    let mut states = BTreeSet::new();
    let mut actions = BTreeSet::new();
    let mut transitions = BTreeSet::new();

    for trace in traces {
        let Some(first) = trace.transitions().first() else {
            continue;
        };
        match &initial {
            None => initial = Some(first.origin.clone()),
            Some(expected) if *expected != first.origin => {
                return Err(MineError::InconsistentInitialState {
                    expected: expected.name().to_string(),
                    found: first.origin.name().to_string(),
                });
            }
            Some(_) => {}
        }
        for t in trace.transitions() {
            states.insert(t.origin.clone());
            actions.insert(t.action.clone());
            if !t.is_degenerate() {
                states.insert(t.destination.clone());
                transitions.insert(t.clone());
            }
        }
    }

    let initial = initial.ok_or(MineError::NoTraces)?;
    states.retain(|s: &State| !s.is_invalid());
    let automaton = Automaton::new(initial, states, actions, transitions)?;
    debug!(
        states = automaton.states().len(),
        transitions = automaton.transitions().len(),
        "mined automaton"
    );
    Ok(automaton)
}
