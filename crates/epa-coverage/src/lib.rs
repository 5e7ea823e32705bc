//! Behavioral coverage over enriched protocol automata.
//!
//! Raw execution results are interpreted into traces, traces yield goals,
//! goals are deduplicated into per-criterion registries that live for a
//! whole search run, and each evaluation reports a normalized fitness.

pub mod archive;
pub mod context;
pub mod criterion;
pub mod evaluator;
pub mod goal;
pub mod interpreter;
pub mod registry;

pub use archive::TestArchive;
pub use context::RunContext;
pub use criterion::Criterion;
pub use evaluator::{CoverageError, CoverageEvaluator, CoverageReport, GoalSpace};
pub use goal::Goal;
pub use interpreter::{InterpretMode, TraceError, TraceInterpreter};
pub use registry::GoalRegistry;
