pub mod execution;
pub mod introspect;

pub use execution::{
    EventStream, ExecutionError, ExecutionResult, Executor, RawDestination, RawEvent,
    ReplayExecutor, TestId,
};
pub use introspect::{ClassRegistry, Introspection, RegistryError};
