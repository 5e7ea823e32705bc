pub mod parse;
pub mod types;

pub use parse::{parse_spec, print_spec};
