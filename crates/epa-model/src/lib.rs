pub mod automaton;
pub mod trace;

pub use automaton::{Automaton, ModelError, State, Transition, TransitionKind};
pub use trace::{AdjacentPair, Trace};
