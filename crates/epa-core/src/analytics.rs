//! Run analytics: per-criterion coverage curves and peaks.

use std::collections::BTreeMap;

use epa_coverage::{CoverageReport, Criterion};
use serde::{Deserialize, Serialize};

/// One evaluation's result for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveragePoint {
    /// Evaluation number within the run, starting at 1.
    pub evaluation: u64,
    /// Goals the evaluated suite covered.
    pub covered: usize,
    /// Known goals the evaluated suite left uncovered.
    pub uncovered: usize,
    /// Coverage fraction (0.0-1.0).
    pub fraction: f64,
}

/// Coverage history of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunAnalytics {
    /// Coverage curve per criterion, one point per evaluation.
    pub curves: BTreeMap<Criterion, Vec<CoveragePoint>>,
    /// Highest coverage fraction seen per criterion.
    pub peak_coverage: BTreeMap<Criterion, f64>,
    /// Suites evaluated so far.
    pub evaluations: u64,
}

impl RunAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new evaluation; returns its number.
    pub fn begin_evaluation(&mut self) -> u64 {
        self.evaluations += 1;
        self.evaluations
    }

    pub fn record(&mut self, evaluation: u64, report: &CoverageReport) {
        self.curves
            .entry(report.criterion)
            .or_default()
            .push(CoveragePoint {
                evaluation,
                covered: report.covered,
                uncovered: report.uncovered,
                fraction: report.coverage_fraction,
            });
        let peak = self.peak_coverage.entry(report.criterion).or_insert(0.0);
        if report.coverage_fraction > *peak {
            *peak = report.coverage_fraction;
        }
    }

    pub fn peak(&self, criterion: Criterion) -> f64 {
        self.peak_coverage.get(&criterion).copied().unwrap_or(0.0)
    }

    pub fn curve(&self, criterion: Criterion) -> &[CoveragePoint] {
        self.curves.get(&criterion).map(Vec::as_slice).unwrap_or(&[])
    }
}
