use std::fmt;

use epa_model::{AdjacentPair, Transition};
use serde::{Deserialize, Serialize};

/// A coverage target. Equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Transition(Transition),
    AdjacentPair(AdjacentPair),
    /// An exceptional transition.
    Exception(Transition),
}

impl Goal {
    /// Textual rendering for logs and reports. Not used for deduplication.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Transition(t) => write!(f, "transition {t}"),
            Goal::AdjacentPair(p) => write!(f, "adjacent {p}"),
            Goal::Exception(t) => write!(f, "exception {t}"),
        }
    }
}
