pub mod load;
pub mod miner;
pub mod serialize;
pub mod validate;

pub use load::{automaton_from_spec, load_automaton, LoadError};
pub use miner::{check_pairing, mine, MineError, MiningBounds};
pub use serialize::{to_dot, to_spec};
pub use validate::{check_introspection, validate_spec, ConfigError, ValidationError};
