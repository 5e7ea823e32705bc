use serde::{Deserialize, Serialize};

/// Label reserved for the invalid-object sentinel. No declared state may use it.
pub const INVALID_STATE_LABEL: &str = "__invalid__";

/// Declarative description of an enriched protocol automaton.
///
/// The same shape is used for hand-written specifications (consumed by the
/// loader) and for automata inferred from traces (produced by the miner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonSpec {
    /// Name of the class under test this automaton describes.
    pub name: String,
    pub states: Vec<StateDecl>,
    pub actions: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<TransitionDecl>,
}

impl AutomatonSpec {
    /// The declared initial states (a well-formed spec has exactly one).
    pub fn initial_states(&self) -> impl Iterator<Item = &StateDecl> {
        self.states.iter().filter(|s| s.initial)
    }
}

// ── States ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDecl {
    pub name: String,
    #[serde(default)]
    pub initial: bool,
}

// ── Transitions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDecl {
    pub origin: String,
    pub action: String,
    pub destination: String,
    #[serde(default)]
    pub kind: TransitionTag,
    /// Failure kind thrown by the action. Present only for exceptional transitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTag {
    #[default]
    Normal,
    Exceptional,
}
