use std::fmt;

use serde::{Deserialize, Serialize};

/// The coverage criteria. The `*Mining` variants run without a declared automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Transition,
    AdjacentEdges,
    Exception,
    TransitionMining,
    AdjacentEdgesMining,
    ExceptionMining,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::Transition,
        Criterion::AdjacentEdges,
        Criterion::Exception,
        Criterion::TransitionMining,
        Criterion::AdjacentEdgesMining,
        Criterion::ExceptionMining,
    ];

    pub fn is_mining(self) -> bool {
        matches!(
            self,
            Criterion::TransitionMining
                | Criterion::AdjacentEdgesMining
                | Criterion::ExceptionMining
        )
    }

    /// Whether goals are discovered from traces rather than fixed up front.
    pub fn is_lazy(self) -> bool {
        self != Criterion::Transition
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Criterion::Transition => "transition",
            Criterion::AdjacentEdges => "adjacent_edges",
            Criterion::Exception => "exception",
            Criterion::TransitionMining => "transition_mining",
            Criterion::AdjacentEdgesMining => "adjacent_edges_mining",
            Criterion::ExceptionMining => "exception_mining",
        };
        f.write_str(name)
    }
}
