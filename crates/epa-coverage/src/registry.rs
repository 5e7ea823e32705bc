//! Append-only, insertion-ordered goal store shared by every evaluation of
//! a run.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::goal::Goal;

#[derive(Debug, Default)]
struct RegistryInner {
    order: Vec<Goal>,
    index: HashMap<Goal, usize>,
}

/// Deduplicated goals in first-discovery order. Never shrinks.
#[derive(Debug, Default)]
pub struct GoalRegistry {
    inner: Mutex<RegistryInner>,
}

impl GoalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `goal` unless an equal goal is present. Returns whether it was
    /// new, and the registered instance. Atomic with respect to other callers.
    pub fn lookup_or_insert(&self, goal: Goal) -> (bool, Goal) {
        let mut inner = self.lock();
        if let Some(&i) = inner.index.get(&goal) {
            return (false, inner.order[i].clone());
        }
        let i = inner.order.len();
        inner.order.push(goal.clone());
        inner.index.insert(goal.clone(), i);
        (true, goal)
    }

    pub fn contains(&self, goal: &Goal) -> bool {
        self.lock().index.contains_key(goal)
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every goal in insertion order.
    pub fn values(&self) -> Vec<Goal> {
        self.lock().order.clone()
    }

    /// Snapshot of every goal's textual key in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().order.iter().map(Goal::key).collect()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
