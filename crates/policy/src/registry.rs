//! Named predicates referenced by policy conditions.

use std::collections::HashMap;

use crate::builtins::RequestPredicate;
use crate::{Error, Result};

/// Anything that can resolve a condition name to a predicate.
pub trait PredicateProvider<S, R> {
    fn lookup(&self, name: &str) -> Result<RequestPredicate<S, R>>;
}

/// An in-memory name → predicate table.
///
/// Populate it before compiling a config. Each compiled evaluator keeps its
/// own copies of the predicates it resolved, so the registry can be dropped or
/// reused afterwards.
#[derive(Debug)]
pub struct PredicateRegistry<S, R> {
    predicates: HashMap<String, RequestPredicate<S, R>>,
}

impl<S, R> Default for PredicateRegistry<S, R> {
    fn default() -> Self {
        Self {
            predicates: HashMap::new(),
        }
    }
}

impl<S, R> PredicateRegistry<S, R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a predicate, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, predicate: RequestPredicate<S, R>) {
        self.predicates.insert(name.into(), predicate);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>, predicate: RequestPredicate<S, R>) -> Self {
        self.register(name, predicate);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }
}

impl<S, R> PredicateProvider<S, R> for PredicateRegistry<S, R> {
    fn lookup(&self, name: &str) -> Result<RequestPredicate<S, R>> {
        self.predicates
            .get(name)
            .cloned()
            .ok_or_else(|| Error::PredicateNotFound(name.to_string()))
    }
}
