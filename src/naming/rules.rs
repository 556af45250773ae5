//! Token rules.
//!
//! Every rule answers two questions: does a normalized value satisfy it, and
//! what regex fragment matches the values it accepts. The manager only ever
//! talks to rules through [`TokenRule`].

use std::collections::BTreeSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use regex::Regex;
use tracing::warn;

use super::predicates::Predicate;
use crate::core::errors::{NamingError, Result};

/// Fragment used when a rule cannot describe its values as a regex.
pub const PERMISSIVE_FRAGMENT: &str = r"[^\s]+";

/// Capability shared by all rule variants.
pub trait TokenRule: Send + Sync + fmt::Debug {
    /// True when `value` satisfies the rule.
    fn validate(&self, value: &str) -> bool;

    /// Unanchored regex fragment matching the accepted values.
    fn to_regex_fragment(&self) -> String;
}

/// Shared handle to a rule.
pub type Rule = Arc<dyn TokenRule>;

/// Regular-expression rule validated by full match.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: String,
    anchored: Regex,
}

impl PatternRule {
    /// Compile `pattern`. Fails with a configuration error when it is not a valid regex.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let anchored = Regex::new(&format!("^(?:{pattern})$")).map_err(|err| {
            NamingError::config(format!("Invalid regular expression '{pattern}': {err}"))
        })?;
        Ok(Self { pattern, anchored })
    }

    /// The pattern as written.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl TokenRule for PatternRule {
    fn validate(&self, value: &str) -> bool {
        self.anchored.is_match(value)
    }

    fn to_regex_fragment(&self) -> String {
        strip_anchors(&self.pattern).to_string()
    }
}

/// Remove one leading `^` and one trailing unescaped `$`.
fn strip_anchors(pattern: &str) -> &str {
    let mut fragment = pattern.strip_prefix('^').unwrap_or(pattern);
    if let Some(body) = fragment.strip_suffix('$') {
        let backslashes = body.chars().rev().take_while(|&c| c == '\\').count();
        if backslashes % 2 == 0 {
            fragment = body;
        }
    }
    fragment
}

/// Rule accepting one of a fixed set of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSetRule {
    values: BTreeSet<String>,
}

impl FixedSetRule {
    /// Build the rule over the deduplicated `values`.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Allowed values, sorted.
    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }
}

impl TokenRule for FixedSetRule {
    fn validate(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    fn to_regex_fragment(&self) -> String {
        let mut members: Vec<&String> = self.values.iter().filter(|v| !v.is_empty()).collect();
        if members.is_empty() {
            return PERMISSIVE_FRAGMENT.to_string();
        }
        // Longest first so a short member never pre-empts a longer one sharing its prefix.
        members.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = members
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");
        format!("(?:{alternation})")
    }
}

/// Rule delegating to an arbitrary predicate.
#[derive(Clone)]
pub struct PredicateRule {
    predicate: Predicate,
    label: String,
}

impl PredicateRule {
    /// Wrap `predicate`; `label` is used in diagnostics (usually the dotted reference).
    pub fn new(predicate: Predicate, label: impl Into<String>) -> Self {
        Self {
            predicate,
            label: label.into(),
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for PredicateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRule")
            .field("label", &self.label)
            .finish()
    }
}

impl TokenRule for PredicateRule {
    fn validate(&self, value: &str) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (self.predicate)(value))) {
            Ok(valid) => valid,
            Err(_) => {
                warn!(predicate = %self.label, value, "Predicate panicked; treating value as invalid");
                false
            }
        }
    }

    fn to_regex_fragment(&self) -> String {
        PERMISSIVE_FRAGMENT.to_string()
    }
}

/// Convention-wide constraints checked on fully assembled names.
#[derive(Debug, Clone, Default)]
pub struct GlobalRules {
    /// Maximum name length in characters; `0` disables the check.
    pub max_length: usize,
    /// Substrings that may not appear in an assembled name.
    pub forbidden_patterns: BTreeSet<String>,
    /// Rule the separator itself must satisfy, checked at configuration time.
    pub separator_rule: Option<Rule>,
}

impl GlobalRules {
    /// Constraints with the given length limit and nothing else.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            ..Self::default()
        }
    }
}
