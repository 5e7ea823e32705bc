//! Per-run mutable state, threaded explicitly through every evaluation.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;

use crate::archive::TestArchive;
use crate::criterion::Criterion;
use crate::registry::GoalRegistry;

/// One goal registry and best-covered counter per criterion, plus the
/// optional test archive. Create one per search run.
#[derive(Debug, Default)]
pub struct RunContext {
    registries: [GoalRegistry; 6],
    best_covered: [AtomicUsize; 6],
    archive: Option<TestArchive>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_archive() -> Self {
        Self {
            archive: Some(TestArchive::new()),
            ..Self::default()
        }
    }

    pub fn registry(&self, criterion: Criterion) -> &GoalRegistry {
        &self.registries[criterion.index()]
    }

    pub fn archive(&self) -> Option<&TestArchive> {
        self.archive.as_ref()
    }

    pub fn best_covered(&self, criterion: Criterion) -> usize {
        self.best_covered[criterion.index()].load(Ordering::Relaxed)
    }

    /// Raise the best covered count for `criterion`. Returns true on improvement.
    pub fn observe_covered(&self, criterion: Criterion, covered: usize) -> bool {
        let previous = self.best_covered[criterion.index()].fetch_max(covered, Ordering::Relaxed);
        if covered > previous {
            info!(%criterion, covered, "best individual covers {covered} goals");
            true
        } else {
            false
        }
    }
}
