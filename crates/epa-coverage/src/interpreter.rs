//! Raw event streams -> traces.
//!
//! Each stream is converted event by event and cut off right after the
//! first transition into the invalid state. Events naming an action or
//! state outside the known vocabulary are trace consistency errors.

use std::collections::BTreeSet;

use epa_model::{Automaton, State, Trace, Transition};
use epa_vif::{EventStream, ExecutionResult, RawDestination, RawEvent, TestId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraceError {
    #[error("{test}: event #{position} uses action '{action}' outside the known vocabulary")]
    UnknownAction {
        test: TestId,
        position: usize,
        action: String,
    },

    #[error("{test}: event #{position} references state '{state}' outside the known vocabulary")]
    UnknownState {
        test: TestId,
        position: usize,
        state: String,
    },
}

/// How trace consistency errors are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpretMode {
    /// Fail the evaluation.
    Strict,
    /// Skip the offending event and log it.
    #[default]
    Tolerant,
}

#[derive(Debug, Clone)]
pub struct TraceInterpreter {
    mode: InterpretMode,
    /// `None` accepts any state name.
    states: Option<BTreeSet<String>>,
    /// `None` accepts any action.
    actions: Option<BTreeSet<String>>,
}

impl TraceInterpreter {
    /// Accept any state and action.
    pub fn open(mode: InterpretMode) -> Self {
        Self {
            mode,
            states: None,
            actions: None,
        }
    }

    /// Vocabulary of a declared automaton. `class_actions` are the actions
    /// the class under test offers beyond the declared ones.
    pub fn declared(
        automaton: &Automaton,
        class_actions: impl IntoIterator<Item = String>,
        mode: InterpretMode,
    ) -> Self {
        let mut actions = automaton.actions().clone();
        actions.extend(class_actions);
        Self {
            mode,
            states: Some(
                automaton
                    .states()
                    .iter()
                    .map(|s| s.name().to_string())
                    .collect(),
            ),
            actions: Some(actions),
        }
    }

    /// Mining vocabulary: states are inferred labels, so any state is accepted.
    pub fn mining(class_actions: impl IntoIterator<Item = String>, mode: InterpretMode) -> Self {
        Self {
            mode,
            states: None,
            actions: Some(class_actions.into_iter().collect()),
        }
    }

    pub fn mode(&self) -> InterpretMode {
        self.mode
    }

    /// Convert every event stream of one execution into a trace.
    pub fn interpret(&self, result: &ExecutionResult) -> Result<Vec<Trace>, TraceError> {
        result
            .streams
            .iter()
            .map(|stream| self.interpret_stream(result.test, stream))
            .collect()
    }

    fn interpret_stream(&self, test: TestId, stream: &EventStream) -> Result<Trace, TraceError> {
        let mut trace = Trace::new();
        for (position, event) in stream.events.iter().enumerate() {
            let transition = match self.convert(test, position, event) {
                Ok(t) => t,
                Err(e) => match self.mode {
                    InterpretMode::Strict => return Err(e),
                    InterpretMode::Tolerant => {
                        warn!(error = %e, "skipping malformed event");
                        continue;
                    }
                },
            };
            trace.record(transition);
            if trace.is_truncated() {
                let dropped = stream.events.len() - position - 1;
                if dropped > 0 {
                    debug!(%test, position, dropped, "trace truncated on invalid state");
                }
                break;
            }
        }
        Ok(trace)
    }

    fn convert(
        &self,
        test: TestId,
        position: usize,
        event: &RawEvent,
    ) -> Result<Transition, TraceError> {
        if !self.knows_action(&event.action) {
            return Err(TraceError::UnknownAction {
                test,
                position,
                action: event.action.clone(),
            });
        }
        let unknown_state = |state: &str| TraceError::UnknownState {
            test,
            position,
            state: state.to_string(),
        };
        if !self.knows_state(&event.origin) {
            return Err(unknown_state(&event.origin));
        }
        let destination = match &event.destination {
            RawDestination::Invalid => State::Invalid,
            RawDestination::State(name) if self.knows_state(name) => State::named(name),
            RawDestination::State(name) => return Err(unknown_state(name)),
        };
        let origin = State::named(&event.origin);
        Ok(match &event.failure {
            Some(failure) => Transition::exceptional(origin, &event.action, destination, failure),
            None => Transition::normal(origin, &event.action, destination),
        })
    }

    fn knows_action(&self, action: &str) -> bool {
        self.actions.as_ref().map_or(true, |a| a.contains(action))
    }

    fn knows_state(&self, state: &str) -> bool {
        state != State::Invalid.name() && self.states.as_ref().map_or(true, |s| s.contains(state))
    }
}
