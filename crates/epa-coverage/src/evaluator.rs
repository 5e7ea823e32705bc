//! Coverage evaluators: one contract, six criteria.
//!
//! `fitness = 1 - covered / upper_bound`, `coverage_fraction = covered /
//! upper_bound`. An empty goal space is vacuously fully covered.

use std::collections::HashSet;
use std::sync::Arc;

use epa_compiler::MiningBounds;
use epa_model::{Automaton, Trace};
use epa_vif::{ExecutionResult, Executor, TestId};
use serde::Serialize;
use tracing::debug;

use crate::context::RunContext;
use crate::criterion::Criterion;
use crate::goal::Goal;
use crate::interpreter::{TraceError, TraceInterpreter};

#[derive(Debug, thiserror::Error)]
pub enum CoverageError {
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("Criterion '{criterion}' needs a declared automaton")]
    NeedsAutomaton { criterion: Criterion },

    #[error("Criterion '{criterion}' runs without a declared automaton")]
    NeedsMiningBounds { criterion: Criterion },
}

/// Where a criterion's goals and upper bound come from.
#[derive(Debug, Clone)]
pub enum GoalSpace {
    Declared(Arc<Automaton>),
    Mined(MiningBounds),
}

/// Outcome of evaluating one suite under one criterion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    /// Criterion the suite was evaluated under.
    pub criterion: Criterion,
    /// `1 - coverage_fraction`; lower is better.
    pub fitness: f64,
    /// Covered goals over the upper bound (0.0-1.0).
    pub coverage_fraction: f64,
    /// Distinct goals this suite covers, clamped to the upper bound.
    pub covered: usize,
    /// Known goals this suite leaves uncovered.
    pub uncovered: usize,
    /// Normalizing denominator.
    pub upper_bound: u128,
}

#[derive(Debug, Clone)]
pub struct CoverageEvaluator {
    criterion: Criterion,
    space: GoalSpace,
    interpreter: TraceInterpreter,
}

impl CoverageEvaluator {
    pub fn new(
        criterion: Criterion,
        space: GoalSpace,
        interpreter: TraceInterpreter,
    ) -> Result<Self, CoverageError> {
        match (&space, criterion.is_mining()) {
            (GoalSpace::Declared(_), true) => {
                return Err(CoverageError::NeedsMiningBounds { criterion })
            }
            (GoalSpace::Mined(_), false) => {
                return Err(CoverageError::NeedsAutomaton { criterion })
            }
            _ => {}
        }
        Ok(Self {
            criterion,
            space,
            interpreter,
        })
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn interpreter(&self) -> &TraceInterpreter {
        &self.interpreter
    }

    /// Normalizing denominator for this criterion.
    pub fn upper_bound(&self) -> u128 {
        match &self.space {
            GoalSpace::Declared(automaton) => {
                let declared = automaton.transitions().len() as u128;
                let edges = automaton.edge_space();
                match self.criterion {
                    Criterion::AdjacentEdges => edges.saturating_mul(edges).saturating_mul(2),
                    Criterion::Exception => edges.saturating_add(declared),
                    _ => declared,
                }
            }
            GoalSpace::Mined(bounds) => match self.criterion {
                Criterion::AdjacentEdgesMining => bounds.adjacent_pairs,
                Criterion::ExceptionMining => bounds.exceptions,
                _ => bounds.transitions,
            },
        }
    }

    /// Goals one trace covers under this criterion, in trace order.
    pub fn goals_of(&self, trace: &Trace) -> Vec<Goal> {
        match (&self.space, self.criterion) {
            (GoalSpace::Declared(automaton), Criterion::Transition) => trace
                .coverable()
                .iter()
                .filter(|t| automaton.contains_transition(t))
                .map(|t| Goal::Transition(t.clone()))
                .collect(),
            (GoalSpace::Declared(automaton), Criterion::AdjacentEdges) => trace
                .adjacent_pairs()
                .filter(|p| {
                    automaton.contains_action(&p.first.action)
                        && automaton.contains_action(&p.second.action)
                })
                .map(Goal::AdjacentPair)
                .collect(),
            (GoalSpace::Declared(automaton), Criterion::Exception) => trace
                .exceptional()
                .filter(|t| automaton.contains_action(&t.action))
                .map(|t| Goal::Exception(t.clone()))
                .collect(),
            (_, Criterion::ExceptionMining) => trace
                .exceptional()
                .map(|t| Goal::Exception(t.clone()))
                .collect(),
            // Only the normal prefix before the first exception counts.
            (_, Criterion::TransitionMining) => trace
                .coverable()
                .iter()
                .take_while(|t| !t.is_exceptional())
                .map(|t| Goal::Transition(t.clone()))
                .collect(),
            (_, Criterion::AdjacentEdgesMining) => {
                trace.adjacent_pairs().map(Goal::AdjacentPair).collect()
            }
            // Rejected by the constructor.
            (
                GoalSpace::Mined(_),
                Criterion::Transition | Criterion::AdjacentEdges | Criterion::Exception,
            ) => Vec::new(),
        }
    }

    /// Evaluate the execution results of one suite.
    ///
    /// Registers newly discovered goals in the run's registry and, when the
    /// run archives, associates each covered goal with its first covering test.
    /// Every result is interpreted before anything is registered, so a failed
    /// evaluation leaves the run context unchanged.
    pub fn evaluate(
        &self,
        ctx: &RunContext,
        results: &[ExecutionResult],
    ) -> Result<CoverageReport, CoverageError> {
        let traces = self.interpret_suite(results)?;
        Ok(self.evaluate_traces(ctx, &traces))
    }

    /// Interpret every result of a suite, tagging each trace with its test.
    pub fn interpret_suite(
        &self,
        results: &[ExecutionResult],
    ) -> Result<Vec<(TestId, Trace)>, CoverageError> {
        let mut traces = Vec::new();
        for result in results {
            let interpreted = self.interpreter.interpret(result)?;
            traces.extend(interpreted.into_iter().map(|trace| (result.test, trace)));
        }
        Ok(traces)
    }

    /// Register and score already interpreted traces.
    pub fn evaluate_traces(&self, ctx: &RunContext, traces: &[(TestId, Trace)]) -> CoverageReport {
        let registry = ctx.registry(self.criterion);
        self.register_fixed_goals(ctx);

        let mut covered = HashSet::new();
        for (test, trace) in traces {
            for goal in self.goals_of(trace) {
                let (is_new, goal) = registry.lookup_or_insert(goal);
                if is_new {
                    debug!(criterion = %self.criterion, goal = %goal, "new goal");
                }
                if let Some(archive) = ctx.archive() {
                    archive.record(&goal, *test);
                }
                covered.insert(goal);
            }
        }

        let known = match &self.space {
            GoalSpace::Declared(automaton) if !self.criterion.is_lazy() => {
                automaton.transitions().len()
            }
            _ => registry.len(),
        };
        let uncovered = known.saturating_sub(covered.len());

        let upper_bound = self.upper_bound();
        let mut covered_count = covered.len();
        if covered_count as u128 > upper_bound {
            debug!(
                criterion = %self.criterion,
                covered = covered_count,
                %upper_bound,
                "covered count clamped to upper bound"
            );
            // upper_bound < covered_count <= usize::MAX here
            covered_count = upper_bound as usize;
        }

        let coverage_fraction = if upper_bound == 0 {
            1.0
        } else {
            covered_count as f64 / upper_bound as f64
        };
        ctx.observe_covered(self.criterion, covered_count);

        CoverageReport {
            criterion: self.criterion,
            fitness: 1.0 - coverage_fraction,
            coverage_fraction,
            covered: covered_count,
            uncovered,
            upper_bound,
        }
    }

    /// Run `suite` through `executor` and evaluate the results.
    pub fn evaluate_suite<E>(
        &self,
        ctx: &RunContext,
        executor: &mut E,
        suite: &E::Suite,
    ) -> Result<CoverageReport, CoverageError>
    where
        E: Executor + ?Sized,
    {
        let results = executor.run(suite);
        self.evaluate(ctx, &results)
    }

    /// The Transition criterion's goal space is the declared transition set.
    fn register_fixed_goals(&self, ctx: &RunContext) {
        let GoalSpace::Declared(automaton) = &self.space else {
            return;
        };
        if self.criterion.is_lazy() {
            return;
        }
        let registry = ctx.registry(self.criterion);
        if registry.len() >= automaton.transitions().len() {
            return;
        }
        for t in automaton.transitions() {
            registry.lookup_or_insert(Goal::Transition(t.clone()));
        }
    }
}
