//! A coverage run: one automaton (declared or none), one evaluator per
//! selected criterion, one run context shared by every evaluation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use epa_compiler::{
    load_automaton, mine, to_dot, to_spec, ConfigError, LoadError, MineError, MiningBounds,
};
use epa_coverage::{
    CoverageError, CoverageEvaluator, CoverageReport, GoalSpace, RunContext, TraceError,
    TraceInterpreter,
};
use epa_ir::parse::{print_spec, ParseError};
use epa_ir::types::AutomatonSpec;
use epa_model::{Automaton, Trace};
use epa_vif::{ExecutionResult, Executor, Introspection};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::analytics::RunAnalytics;
use crate::config::{EngineConfig, EngineConfigError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Engine config error: {0}")]
    EngineConfig(#[from] EngineConfigError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Configuration errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Config(Vec<ConfigError>),

    #[error("The selected criteria need a declared automaton")]
    MissingAutomaton,

    #[error("Coverage error: {0}")]
    Coverage(#[from] CoverageError),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("Mining error: {0}")]
    Mine(#[from] MineError),

    #[error("Serialization error: {0}")]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct CoverageSession {
    config: EngineConfig,
    name: String,
    automaton: Option<Arc<Automaton>>,
    evaluators: Vec<CoverageEvaluator>,
    /// Interprets results retained for mining.
    miner: TraceInterpreter,
    context: RunContext,
    analytics: Mutex<RunAnalytics>,
    /// Distinct traces kept for mining.
    traces: Mutex<BTreeSet<Trace>>,
}

impl CoverageSession {
    /// Set up a run. `spec` is required when any declared criterion is
    /// selected. Configuration mismatches with the class are fatal.
    pub fn new<I>(
        config: EngineConfig,
        spec: Option<&AutomatonSpec>,
        intro: &I,
    ) -> Result<Self, SessionError>
    where
        I: Introspection + ?Sized,
    {
        config.validate()?;
        if config.needs_automaton() && spec.is_none() {
            return Err(SessionError::MissingAutomaton);
        }

        let automaton = match spec {
            Some(spec) => Some(Arc::new(load_automaton(spec, intro)?)),
            None => None,
        };
        let bounds = if config.needs_mining_bounds() {
            Some(MiningBounds::from_introspection(intro).map_err(SessionError::Config)?)
        } else {
            None
        };

        let class_actions = intro.action_catalogue().into_keys().collect::<Vec<_>>();
        let mut evaluators = Vec::with_capacity(config.criteria.len());
        for &criterion in &config.criteria {
            let (space, interpreter) = match (&automaton, bounds) {
                (Some(automaton), _) if !criterion.is_mining() => (
                    GoalSpace::Declared(Arc::clone(automaton)),
                    TraceInterpreter::declared(
                        automaton,
                        class_actions.clone(),
                        config.interpret_mode,
                    ),
                ),
                (_, Some(bounds)) if criterion.is_mining() => (
                    GoalSpace::Mined(bounds),
                    TraceInterpreter::mining(class_actions.clone(), config.interpret_mode),
                ),
                _ => return Err(SessionError::MissingAutomaton),
            };
            evaluators.push(CoverageEvaluator::new(criterion, space, interpreter)?);
        }

        let context = if config.archive {
            RunContext::with_archive()
        } else {
            RunContext::new()
        };
        let name = spec.map_or_else(|| intro.class_name().to_string(), |s| s.name.clone());
        info!(
            class = %name,
            criteria = evaluators.len(),
            declared = automaton.is_some(),
            "coverage session ready"
        );

        Ok(Self {
            miner: TraceInterpreter::mining(class_actions, config.interpret_mode),
            config,
            name,
            automaton,
            evaluators,
            context,
            analytics: Mutex::new(RunAnalytics::new()),
            traces: Mutex::new(BTreeSet::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn automaton(&self) -> Option<&Automaton> {
        self.automaton.as_deref()
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn analytics(&self) -> RunAnalytics {
        lock(&self.analytics).clone()
    }

    /// Evaluate one suite's execution results under every selected criterion,
    /// in configuration order.
    ///
    /// All results are interpreted for every criterion before any goal is
    /// registered; on error the run state is left untouched.
    pub fn evaluate(
        &self,
        results: &[ExecutionResult],
    ) -> Result<Vec<CoverageReport>, SessionError> {
        let interpreted = self
            .evaluators
            .iter()
            .map(|eval| eval.interpret_suite(results))
            .collect::<Result<Vec<_>, _>>()?;
        let retained = if self.config.mined_output.is_some() {
            Some(self.interpret_for_mining(results)?)
        } else {
            None
        };

        let reports = self
            .evaluators
            .iter()
            .zip(&interpreted)
            .map(|(eval, traces)| eval.evaluate_traces(&self.context, traces))
            .collect::<Vec<_>>();

        {
            let mut analytics = lock(&self.analytics);
            let evaluation = analytics.begin_evaluation();
            for report in &reports {
                analytics.record(evaluation, report);
            }
        }
        if let Some(traces) = retained {
            lock(&self.traces).extend(traces);
        }
        Ok(reports)
    }

    /// Run `suite` once and evaluate the results.
    pub fn evaluate_suite<E>(
        &self,
        executor: &mut E,
        suite: &E::Suite,
    ) -> Result<Vec<CoverageReport>, SessionError>
    where
        E: Executor + ?Sized,
    {
        let results = executor.run(suite);
        self.evaluate(&results)
    }

    /// Evaluate several suites concurrently. Results are in input order.
    pub fn evaluate_batch(
        &self,
        batch: &[Vec<ExecutionResult>],
    ) -> Vec<Result<Vec<CoverageReport>, SessionError>> {
        batch.par_iter().map(|results| self.evaluate(results)).collect()
    }

    /// Keep the traces of `results` for mining at the end of the run.
    /// A trace already retained is stored once.
    pub fn retain(&self, results: &[ExecutionResult]) -> Result<(), SessionError> {
        let interpreted = self.interpret_for_mining(results)?;
        lock(&self.traces).extend(interpreted);
        Ok(())
    }

    /// Number of distinct traces retained for mining.
    pub fn retained(&self) -> usize {
        lock(&self.traces).len()
    }

    fn interpret_for_mining(
        &self,
        results: &[ExecutionResult],
    ) -> Result<Vec<Trace>, SessionError> {
        let mut interpreted = Vec::new();
        for result in results {
            interpreted.extend(self.miner.interpret(result)?);
        }
        Ok(interpreted)
    }

    /// Infer an automaton from every retained trace.
    pub fn mine(&self) -> Result<Automaton, SessionError> {
        let traces = lock(&self.traces);
        Ok(mine(traces.iter())?)
    }

    /// Mine and write the automaton to the configured output, plus a `.dot`
    /// rendering next to it. Returns the JSON path, or `None` when no output
    /// is configured.
    pub fn write_mined(&self) -> Result<Option<PathBuf>, SessionError> {
        let Some(path) = &self.config.mined_output else {
            return Ok(None);
        };
        let automaton = self.mine()?;
        write_automaton(&automaton, &self.name, path)?;
        Ok(Some(path.clone()))
    }
}

/// Write `automaton` as JSON to `path` and as Graphviz to `path` with a `.dot` extension.
pub fn write_automaton(automaton: &Automaton, name: &str, path: &Path) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = print_spec(&to_spec(automaton, name))?;
    std::fs::write(path, json)?;
    let dot_path = path.with_extension("dot");
    std::fs::write(&dot_path, to_dot(automaton, name))?;
    debug!(json = %path.display(), dot = %dot_path.display(), "mined automaton written");
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
