//! Goal -> first covering test associations.
//!
//! The map is compare-and-insert so the first covering test wins even when
//! suites are evaluated concurrently. Newly archived associations are also
//! pushed onto a lock-free queue that the search loop drains.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crossbeam::queue::SegQueue;
use epa_vif::TestId;

use crate::goal::Goal;

#[derive(Debug, Default)]
pub struct TestArchive {
    covering: Mutex<HashMap<Goal, TestId>>,
    fresh: SegQueue<(Goal, TestId)>,
}

impl TestArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `goal` with `test` unless it already has a covering test.
    /// Returns true when this call created the association.
    pub fn record(&self, goal: &Goal, test: TestId) -> bool {
        let mut covering = self
            .covering
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if covering.contains_key(goal) {
            return false;
        }
        covering.insert(goal.clone(), test);
        self.fresh.push((goal.clone(), test));
        true
    }

    pub fn covering_test(&self, goal: &Goal) -> Option<TestId> {
        self.covering
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(goal)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.covering
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every association archived since the last drain, oldest first.
    pub fn drain(&self) -> Vec<(Goal, TestId)> {
        std::iter::from_fn(|| self.fresh.pop()).collect()
    }
}
