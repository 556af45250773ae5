//! Named predicates for `callable` rules.
//!
//! Conventions refer to predicates by dotted path (`naming.checks.is_alpha`).
//! The embedding application registers the functions it wants to expose; there
//! is no dynamic loading.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::errors::{NamingError, Result};

/// Single-argument boolean check over a token value.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Dotted name to predicate lookup.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    entries: BTreeMap<String, Predicate>,
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PredicateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the stock `naming.checks.*` predicates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("naming.checks.is_alpha", |v: &str| {
            !v.is_empty() && v.chars().all(|c| c.is_ascii_alphabetic())
        });
        registry.register("naming.checks.is_alphanumeric", |v: &str| {
            !v.is_empty() && v.chars().all(|c| c.is_ascii_alphanumeric())
        });
        registry.register("naming.checks.is_lower", |v: &str| {
            v.chars().any(|c| c.is_ascii_lowercase()) && !v.chars().any(|c| c.is_ascii_uppercase())
        });
        registry.register("naming.checks.is_camel_case", |v: &str| {
            v.chars().next().is_some_and(|c| c.is_ascii_lowercase())
                && v.chars().all(|c| c.is_ascii_alphanumeric())
        });
        registry.register("naming.checks.is_pascal_case", |v: &str| {
            v.chars().next().is_some_and(|c| c.is_ascii_uppercase())
                && v.chars().all(|c| c.is_ascii_alphanumeric())
        });
        registry
    }

    /// Register (or replace) a predicate.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(predicate));
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolve a dotted reference for `token`.
    pub fn resolve(&self, reference: &str, token: &str) -> Result<Predicate> {
        let dotted = reference
            .split_once('.')
            .is_some_and(|(module, name)| !module.is_empty() && !name.is_empty());
        if !dotted {
            return Err(NamingError::config_field(
                format!(
                    "Callable reference '{reference}' for token '{token}' must be a dotted path such as 'module.function'."
                ),
                token,
            ));
        }

        self.entries.get(reference).cloned().ok_or_else(|| {
            NamingError::config_field(
                format!("Could not resolve callable '{reference}' for token '{token}'."),
                token,
            )
        })
    }
}
