//! Introspection collaborator: which operations count as actions, their
//! preconditions, and the boolean queries that define declared states.
//!
//! The engine only consumes the [`Introspection`] trait. [`ClassRegistry`]
//! is an explicit-registration implementation: the class author registers
//! closures instead of annotating methods.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lookups the automaton loader and miner need from the class under test.
pub trait Introspection {
    /// A live object of the class under test.
    type Instance: ?Sized;

    /// Name of the class under test (used in error messages).
    fn class_name(&self) -> &str;

    /// Whether a boolean query exists for the named state.
    fn has_state_predicate(&self, state: &str) -> bool;

    /// Evaluate the named state's query. `None` when no query exists.
    fn state_predicate(&self, state: &str, instance: &Self::Instance) -> Option<bool>;

    /// Evaluate the named action's precondition. `None` when no precondition exists.
    fn action_precondition(&self, action: &str, instance: &Self::Instance) -> Option<bool>;

    /// Action name -> callable operations labelled with it (methods and constructors).
    fn action_catalogue(&self) -> BTreeMap<String, BTreeSet<String>>;

    /// Actions that are constructors. Constructors need no precondition.
    fn constructor_actions(&self) -> BTreeSet<String>;

    /// Actions that have a precondition registered.
    fn precondition_actions(&self) -> BTreeSet<String>;
}

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Repeated precondition for action '{action}'")]
    DuplicatePrecondition { action: String },

    #[error("Repeated state predicate for state '{state}'")]
    DuplicateStatePredicate { state: String },
}

/// Manually registered introspection data for a class `T`.
pub struct ClassRegistry<T> {
    class_name: String,
    states: BTreeMap<String, Predicate<T>>,
    actions: BTreeMap<String, BTreeSet<String>>,
    constructors: BTreeSet<String>,
    preconditions: BTreeMap<String, Predicate<T>>,
}

impl<T> ClassRegistry<T> {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            states: BTreeMap::new(),
            actions: BTreeMap::new(),
            constructors: BTreeSet::new(),
            preconditions: BTreeMap::new(),
        }
    }

    /// Register the boolean query that holds when an instance is in `state`.
    pub fn register_state<F>(&mut self, state: &str, predicate: F) -> Result<(), RegistryError>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        if self.states.contains_key(state) {
            return Err(RegistryError::DuplicateStatePredicate {
                state: state.to_string(),
            });
        }
        self.states.insert(state.to_string(), Box::new(predicate));
        Ok(())
    }

    /// Label a method as an occurrence of `action`. Several methods may share an action.
    pub fn register_action(&mut self, action: &str, operation: &str) {
        self.actions
            .entry(action.to_string())
            .or_default()
            .insert(operation.to_string());
    }

    /// Label a constructor as an occurrence of `action`.
    pub fn register_constructor(&mut self, action: &str, operation: &str) {
        self.register_action(action, operation);
        self.constructors.insert(action.to_string());
    }

    /// Register the precondition of `action`. At most one per action.
    pub fn register_precondition<F>(
        &mut self,
        action: &str,
        predicate: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        if self.preconditions.contains_key(action) {
            return Err(RegistryError::DuplicatePrecondition {
                action: action.to_string(),
            });
        }
        self.preconditions
            .insert(action.to_string(), Box::new(predicate));
        Ok(())
    }

    /// Evaluate every registered precondition against `instance`, sorted by action name.
    pub fn enabled_actions(&self, instance: &T) -> Vec<(String, bool)> {
        self.preconditions
            .iter()
            .map(|(action, pre)| (action.clone(), pre(instance)))
            .collect()
    }

    /// Declared states whose query holds for `instance`.
    pub fn matching_states(&self, instance: &T) -> Vec<String> {
        self.states
            .iter()
            .filter(|(_, pred)| pred(instance))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl<T> Introspection for ClassRegistry<T> {
    type Instance = T;

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn has_state_predicate(&self, state: &str) -> bool {
        self.states.contains_key(state)
    }

    fn state_predicate(&self, state: &str, instance: &T) -> Option<bool> {
        self.states.get(state).map(|pred| pred(instance))
    }

    fn action_precondition(&self, action: &str, instance: &T) -> Option<bool> {
        self.preconditions.get(action).map(|pre| pre(instance))
    }

    fn action_catalogue(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.actions.clone()
    }

    fn constructor_actions(&self) -> BTreeSet<String> {
        self.constructors.clone()
    }

    fn precondition_actions(&self) -> BTreeSet<String> {
        self.preconditions.keys().cloned().collect()
    }
}

impl<T> fmt::Debug for ClassRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("class_name", &self.class_name)
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("actions", &self.actions)
            .field("constructors", &self.constructors)
            .field("preconditions", &self.preconditions.keys().collect::<Vec<_>>())
            .finish()
    }
}
