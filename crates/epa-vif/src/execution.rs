//! Execution collaborator: raw per-object event streams produced by running
//! a suite against the class under test.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one test in a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(pub u64);

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "test-{}", self.0)
    }
}

/// Where an observed action left the object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawDestination {
    State(String),
    /// The object crashed or reached an illegal condition.
    Invalid,
}

/// One observed action invocation on one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub origin: String,
    pub action: String,
    pub destination: RawDestination,
    /// Failure kind thrown by the action, if it did not return normally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RawEvent {
    pub fn normal(origin: &str, action: &str, destination: &str) -> Self {
        Self {
            origin: origin.to_string(),
            action: action.to_string(),
            destination: RawDestination::State(destination.to_string()),
            failure: None,
        }
    }

    pub fn exceptional(origin: &str, action: &str, destination: &str, failure: &str) -> Self {
        Self {
            origin: origin.to_string(),
            action: action.to_string(),
            destination: RawDestination::State(destination.to_string()),
            failure: Some(failure.to_string()),
        }
    }

    pub fn crash(origin: &str, action: &str) -> Self {
        Self {
            origin: origin.to_string(),
            action: action.to_string(),
            destination: RawDestination::Invalid,
            failure: None,
        }
    }
}

/// Events of one constructed instance, in invocation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStream {
    /// Optional label of the observed instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub events: Vec<RawEvent>,
}

impl EventStream {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            object: None,
            events,
        }
    }
}

/// Outcome of executing one test. A test may construct several instances,
/// each yielding its own stream. Crashed or timed-out tests arrive here
/// with whatever prefix was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub test: TestId,
    #[serde(default)]
    pub streams: Vec<EventStream>,
}

impl ExecutionResult {
    pub fn new(test: TestId, streams: Vec<EventStream>) -> Self {
        Self { test, streams }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Test '{test}' recorded more than once")]
    DuplicateTest { test: TestId },
}

/// Trait abstracting suite execution against the class under test.
///
/// One synchronous call per evaluated suite.
pub trait Executor {
    type Suite: ?Sized;

    fn run(&mut self, suite: &Self::Suite) -> Vec<ExecutionResult>;
}

/// Executor that serves previously recorded results.
///
/// A test id without a recording yields a result with no streams.
#[derive(Debug, Clone, Default)]
pub struct ReplayExecutor {
    recorded: BTreeMap<TestId, ExecutionResult>,
    runs: u64,
}

impl ReplayExecutor {
    pub fn from_results(
        results: impl IntoIterator<Item = ExecutionResult>,
    ) -> Result<Self, ExecutionError> {
        let mut recorded = BTreeMap::new();
        for result in results {
            let test = result.test;
            if recorded.insert(test, result).is_some() {
                return Err(ExecutionError::DuplicateTest { test });
            }
        }
        Ok(Self { recorded, runs: 0 })
    }

    /// Load a JSON array of execution results.
    pub fn from_json(json: &str) -> Result<Self, ExecutionError> {
        let results: Vec<ExecutionResult> = serde_json::from_str(json)?;
        Self::from_results(results)
    }

    pub fn recorded_tests(&self) -> impl Iterator<Item = TestId> + '_ {
        self.recorded.keys().copied()
    }

    /// Number of suites served so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

impl Executor for ReplayExecutor {
    type Suite = [TestId];

    fn run(&mut self, suite: &[TestId]) -> Vec<ExecutionResult> {
        self.runs += 1;
        suite
            .iter()
            .map(|test| {
                self.recorded
                    .get(test)
                    .cloned()
                    .unwrap_or_else(|| ExecutionResult::new(*test, Vec::new()))
            })
            .collect()
    }
}
