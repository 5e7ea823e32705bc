//! Engine configuration: selected criteria, interpretation mode, archiving
//! and the mined-automaton output path.
use std::path::PathBuf;

use epa_coverage::{Criterion, InterpretMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum EngineConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No coverage criterion selected")]
    NoCriteria,

    #[error("Criterion '{criterion}' selected more than once")]
    DuplicateCriterion { criterion: Criterion },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub criteria: Vec<Criterion>,
    pub interpret_mode: InterpretMode,
    /// Associate covered goals with their first covering test.
    pub archive: bool,
    /// Where to write the mined automaton (JSON). A `.dot` rendering is
    /// written next to it.
    pub mined_output: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            criteria: vec![Criterion::Transition],
            interpret_mode: InterpretMode::Tolerant,
            archive: false,
            mined_output: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if self.criteria.is_empty() {
            return Err(EngineConfigError::NoCriteria);
        }
        for (i, criterion) in self.criteria.iter().enumerate() {
            if self.criteria[..i].contains(criterion) {
                return Err(EngineConfigError::DuplicateCriterion {
                    criterion: *criterion,
                });
            }
        }
        Ok(())
    }

    /// Whether any selected criterion needs a declared automaton.
    pub fn needs_automaton(&self) -> bool {
        self.criteria.iter().any(|c| !c.is_mining())
    }

    pub fn needs_mining_bounds(&self) -> bool {
        self.criteria.iter().any(|c| c.is_mining())
    }
}
