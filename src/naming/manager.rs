//! The naming manager: builds, parses, validates and updates names.
//!
//! A [`Manager`] owns the token order, separator, normalizers and global
//! constraints of one convention. The rule map and the regexes derived from it
//! live in an immutable snapshot published through [`ArcSwap`];
//! `add_rule`/`remove_rule` compile a new snapshot and swap it in, so readers
//! never observe a half-updated rule map or a stale cached regex.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use tracing::{debug, trace};

use super::normalizers::Normalizer;
use super::pattern::{synthesize, RegexOptions};
use super::rules::{GlobalRules, Rule};
use super::types::{NameInput, Overrides, Parsed, TokenData, TokenValue};
use crate::core::config::validation::{
    validate_identifiers, validate_non_empty_str, validate_unique,
};
use crate::core::errors::{NamingError, Result};

/// Everything a [`Manager`] is built from.
#[derive(Clone, Default)]
pub struct ManagerParts {
    /// Token order
    pub tokens: Vec<String>,
    /// Separator placed between token values
    pub separator: String,
    /// Token to rule; tokens without a rule accept any value
    pub rules: IndexMap<String, Rule>,
    /// Token to normalizer
    pub normalizers: IndexMap<String, Normalizer>,
    /// Convention-wide constraints
    pub global_rules: GlobalRules,
}

impl fmt::Debug for ManagerParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerParts")
            .field("tokens", &self.tokens)
            .field("separator", &self.separator)
            .field("rules", &self.rules)
            .field("normalizers", &self.normalizers.keys().collect::<Vec<_>>())
            .field("global_rules", &self.global_rules)
            .finish()
    }
}

/// Rule map plus the regexes compiled from it.
struct RuleSet {
    rules: IndexMap<String, Rule>,
    /// Anchored, capturing, tokens optional right-to-left
    extraction: Regex,
    /// Anchored, every token required
    complete: Regex,
    patterns: RwLock<HashMap<RegexOptions, Arc<str>>>,
}

impl RuleSet {
    fn compile(tokens: &[String], separator: &str, rules: IndexMap<String, Rule>) -> Result<Self> {
        let extraction_src = synthesize(tokens, &rules, separator, RegexOptions::extraction());
        let complete_src = synthesize(tokens, &rules, separator, RegexOptions::complete());
        debug!(pattern = %extraction_src, "Synthesized extraction regex");

        let extraction = compile_regex(&extraction_src)?;
        let complete = compile_regex(&complete_src)?;

        let mut patterns = HashMap::new();
        patterns.insert(RegexOptions::extraction(), Arc::from(extraction_src));
        patterns.insert(RegexOptions::complete(), Arc::from(complete_src));

        Ok(Self {
            rules,
            extraction,
            complete,
            patterns: RwLock::new(patterns),
        })
    }
}

fn compile_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| {
        NamingError::config(format!(
            "Token rules do not compose into a valid matching regex '{pattern}': {err}"
        ))
    })
}

/// Naming-convention engine.
pub struct Manager {
    tokens: Vec<String>,
    separator: String,
    normalizers: IndexMap<String, Normalizer>,
    global_rules: GlobalRules,
    rule_set: ArcSwap<RuleSet>,
    writer: Mutex<()>,
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("tokens", &self.tokens)
            .field("separator", &self.separator)
            .field("rules", &self.rule_set.load().rules)
            .field("normalizers", &self.normalizers.keys().collect::<Vec<_>>())
            .field("global_rules", &self.global_rules)
            .finish()
    }
}

impl Manager {
    /// Create a manager.
    ///
    /// Fails with a configuration error when the separator is empty, a token
    /// name is not identifier-shaped or repeated, or the rules do not compose
    /// into a valid regex.
    pub fn new(
        tokens: Vec<String>,
        separator: impl Into<String>,
        rules: IndexMap<String, Rule>,
        normalizers: IndexMap<String, Normalizer>,
        global_rules: GlobalRules,
    ) -> Result<Self> {
        let separator = separator.into();
        validate_non_empty_str(&separator, "separator")?;
        validate_identifiers(&tokens, "tokens")?;
        validate_unique(&tokens, "tokens")?;

        let rule_set = RuleSet::compile(&tokens, &separator, rules)?;
        Ok(Self {
            tokens,
            separator,
            normalizers,
            global_rules,
            rule_set: ArcSwap::from_pointee(rule_set),
            writer: Mutex::new(()),
        })
    }

    /// Create a manager from a [`ManagerParts`] snapshot.
    pub fn from_parts(parts: ManagerParts) -> Result<Self> {
        Self::new(
            parts.tokens,
            parts.separator,
            parts.rules,
            parts.normalizers,
            parts.global_rules,
        )
    }

    /// Snapshot of the current configuration, suitable for [`Manager::from_parts`].
    pub fn to_parts(&self) -> ManagerParts {
        ManagerParts {
            tokens: self.tokens.clone(),
            separator: self.separator.clone(),
            rules: self.rule_set.load().rules.clone(),
            normalizers: self.normalizers.clone(),
            global_rules: self.global_rules.clone(),
        }
    }

    /// Token order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Separator.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Global constraints.
    pub fn global_rules(&self) -> &GlobalRules {
        &self.global_rules
    }

    /// Current rule for `token`.
    pub fn rule(&self, token: &str) -> Option<Rule> {
        self.rule_set.load().rules.get(token).cloned()
    }

    /// Unwrap, normalize and trim a raw value for `token`.
    pub fn normalize_value(&self, token: &str, value: &TokenValue) -> String {
        let raw = value.as_str();
        if raw.is_empty() {
            return String::new();
        }
        match self.normalizers.get(token) {
            Some(normalizer) => normalizer(raw).trim().to_string(),
            None => raw.trim().to_string(),
        }
    }

    /// Assemble a name from token values.
    ///
    /// Values are normalized and checked against their token's rule; empty
    /// values are left out. The assembled name must then satisfy the global
    /// constraints.
    pub fn build<I, K, V>(&self, values: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<TokenValue>,
    {
        let values: IndexMap<String, TokenValue> = values
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .collect();
        self.build_values(&values)
    }

    fn build_values(&self, values: &IndexMap<String, TokenValue>) -> Result<String> {
        let unknown: Vec<&str> = values
            .keys()
            .map(String::as_str)
            .filter(|key| !self.tokens.iter().any(|t| t.as_str() == *key))
            .collect();
        if !unknown.is_empty() {
            let joined = unknown.join(", ");
            return Err(NamingError::validation_field(
                format!(
                    "Unknown tokens: [{joined}]. Expected one of: [{}].",
                    self.tokens.join(", ")
                ),
                joined,
            ));
        }

        let snapshot = self.rule_set.load();
        let mut parts: Vec<String> = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            let normalized = values
                .get(token)
                .map(|value| self.normalize_value(token, value))
                .unwrap_or_default();
            if normalized.is_empty() {
                continue;
            }
            if !self.token_value_is_valid(&snapshot.rules, token, &normalized) {
                return Err(NamingError::validation_field(
                    format!(
                        "Invalid value '{normalized}' for token '{token}' (separator: '{}').",
                        self.separator
                    ),
                    token.as_str(),
                ));
            }
            parts.push(normalized);
        }

        let name = parts.join(&self.separator);
        self.check_global_rules(&name)?;
        Ok(name)
    }

    fn check_global_rules(&self, name: &str) -> Result<()> {
        let max_length = self.global_rules.max_length;
        let length = name.chars().count();
        if max_length > 0 && length > max_length {
            return Err(NamingError::limit_exceeded(
                format!("Name '{name}' exceeds the maximum length of {max_length} (got {length})."),
                max_length.to_string(),
                length.to_string(),
            ));
        }

        if let Some(pattern) = self
            .global_rules
            .forbidden_patterns
            .iter()
            .find(|p| !p.is_empty() && name.contains(p.as_str()))
        {
            return Err(NamingError::validation(format!(
                "Name '{name}' contains the forbidden pattern '{pattern}'."
            )));
        }
        Ok(())
    }

    /// True when `value` may stand for `token`: it must not contain the
    /// separator and must satisfy the token's rule, if any.
    pub fn is_valid_token(&self, token: &str, value: &str) -> bool {
        self.token_value_is_valid(&self.rule_set.load().rules, token, value)
    }

    fn token_value_is_valid(&self, rules: &IndexMap<String, Rule>, token: &str, value: &str) -> bool {
        if value.contains(self.separator.as_str()) {
            return false;
        }
        rules.get(token).map_or(true, |rule| rule.validate(value))
    }

    /// True when `name` carries every token in order and each value satisfies its rule.
    pub fn is_valid(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let snapshot = self.rule_set.load();
        if !snapshot.complete.is_match(name) {
            return false;
        }
        self.extract(&snapshot, name)
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .all(|(token, value)| self.token_value_is_valid(&snapshot.rules, token, value))
    }

    /// Extract token values with the lenient regex. Unmatched tokens map to `""`.
    pub fn get_data(&self, name: &str) -> TokenData {
        self.extract(&self.rule_set.load(), name)
    }

    fn extract(&self, snapshot: &RuleSet, name: &str) -> TokenData {
        let captures = snapshot.extraction.captures(name);
        self.tokens
            .iter()
            .map(|token| {
                let value = captures
                    .as_ref()
                    .and_then(|caps| caps.name(token))
                    .map_or("", |m| m.as_str());
                (token.clone(), value.to_string())
            })
            .collect()
    }

    /// Parse a name, falling back to a positional split when the regex finds nothing.
    pub fn parse(&self, name: &str) -> Parsed {
        if name.is_empty() {
            return Parsed::Unparsed(String::new());
        }

        let snapshot = self.rule_set.load();
        let data = self.extract(&snapshot, name);
        if data.values().any(|v| !v.is_empty()) {
            return Parsed::Tokens(data);
        }

        trace!(name, "Regex extraction found nothing; trying positional split");
        let parts: Vec<&str> = name.split(self.separator.as_str()).collect();
        if parts.len() > self.tokens.len() {
            return Parsed::Unparsed(name.to_string());
        }

        let mut positional: TokenData = self
            .tokens
            .iter()
            .map(|token| (token.clone(), String::new()))
            .collect();
        for (token, part) in self.tokens.iter().zip(&parts) {
            if !self.token_value_is_valid(&snapshot.rules, token, part) {
                trace!(name, token = %token, part, "Positional part rejected");
                return Parsed::Unparsed(name.to_string());
            }
            positional.insert(token.clone(), part.to_string());
        }

        if positional.values().all(String::is_empty) {
            return Parsed::Unparsed(name.to_string());
        }
        Parsed::Tokens(positional)
    }

    /// Value of `token` in `name`.
    pub fn get_token_value(&self, name: &str, token: &str) -> Result<String> {
        if !self.tokens.iter().any(|t| t == token) {
            return Err(NamingError::validation_field(
                format!(
                    "Token '{token}' is not defined. Available tokens: [{}].",
                    self.tokens.join(", ")
                ),
                token,
            ));
        }
        Ok(self
            .get_data(name)
            .swap_remove(token)
            .unwrap_or_default())
    }

    /// Human-readable problems with `name`; empty when it is valid.
    pub fn get_errors(&self, name: &str) -> Vec<String> {
        if name.is_empty() {
            return vec!["Name must be a non-empty string.".to_string()];
        }

        let mut errors = Vec::new();
        let parts: Vec<&str> = name.split(self.separator.as_str()).collect();
        if parts.len() > self.tokens.len() {
            errors.push(format!(
                "Name has too many parts: expected at most {}, got {}.",
                self.tokens.len(),
                parts.len()
            ));
        }

        for (token, part) in self.tokens.iter().zip(&parts) {
            if !self.is_valid_token(token, part) {
                errors.push(format!("Invalid value '{part}' for token '{token}'."));
            }
        }

        if errors.is_empty() && !self.is_valid(name) {
            errors.push("Name does not match the required naming pattern.".to_string());
        }
        errors
    }

    /// Matching regex source for `options`, cached per rule set.
    pub fn get_matching_regex(&self, options: RegexOptions) -> String {
        let snapshot = self.rule_set.load();
        if let Some(pattern) = snapshot.patterns.read().get(&options) {
            return pattern.to_string();
        }

        let pattern = synthesize(&self.tokens, &snapshot.rules, &self.separator, options);
        debug!(?options, pattern = %pattern, "Synthesized matching regex");
        snapshot
            .patterns
            .write()
            .entry(options)
            .or_insert_with(|| Arc::from(pattern.as_str()));
        pattern
    }

    /// Replace token values in an existing name and rebuild it.
    ///
    /// A name the regex cannot parse is accepted as a bare value for the first
    /// token when it is valid for it. An empty name builds from `overrides` alone.
    pub fn update<I, K, V>(&self, name: &str, overrides: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<TokenValue>,
    {
        let overrides: IndexMap<String, TokenValue> = overrides
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .collect();

        if name.is_empty() {
            return self.build_values(&overrides);
        }

        let mut data = self.get_data(name);
        if data.values().all(String::is_empty) {
            match self.tokens.first() {
                Some(first) if self.is_valid_token(first, name) => {
                    data.insert(first.clone(), name.to_string());
                }
                _ => {
                    return Err(NamingError::validation(format!(
                        "Could not parse '{name}' against tokens [{}], and it is not a valid value for the first token '{}'.",
                        self.tokens.join(", "),
                        self.tokens.first().map_or("", String::as_str)
                    )))
                }
            }
        }

        let mut merged: IndexMap<String, TokenValue> = data
            .into_iter()
            .map(|(token, value)| (token, TokenValue::Text(value)))
            .collect();
        for (token, value) in overrides {
            let normalized = self.normalize_value(&token, &value);
            merged.insert(token, TokenValue::Text(normalized));
        }
        self.build_values(&merged)
    }

    /// Resolve a mapping, a positional sequence or an assembled name into a name.
    ///
    /// Mappings and sequences are built; a plain name is returned unchanged.
    pub fn resolve(&self, input: impl Into<NameInput>) -> Result<String> {
        match input.into() {
            NameInput::Mapping(values) => self.build_values(&values),
            NameInput::Sequence(values) => {
                if values.len() > self.tokens.len() {
                    return Err(NamingError::limit_exceeded(
                        format!(
                            "Input sequence has {} items but only {} tokens are defined.",
                            values.len(),
                            self.tokens.len()
                        ),
                        self.tokens.len().to_string(),
                        values.len().to_string(),
                    ));
                }
                let mapped: IndexMap<String, TokenValue> =
                    self.tokens.iter().cloned().zip(values).collect();
                self.build_values(&mapped)
            }
            NameInput::Name(name) => Ok(name),
        }
    }

    /// [`Manager::resolve`] against a temporary manager whose tokens, rules or
    /// normalizers are replaced by `overrides`.
    pub fn resolve_with(&self, input: impl Into<NameInput>, overrides: &Overrides) -> Result<String> {
        if overrides.is_empty() {
            return self.resolve(input);
        }

        let mut parts = self.to_parts();
        if let Some(tokens) = &overrides.tokens {
            parts.tokens = tokens.clone();
        }
        if let Some(rules) = &overrides.rules {
            parts.rules = rules.clone();
        }
        if let Some(normalizers) = &overrides.normalizers {
            parts.normalizers = normalizers.clone();
        }
        Manager::from_parts(parts)?.resolve(input)
    }

    /// Add or replace the rule for `token`.
    ///
    /// The new rule set is compiled before it is published; on error the
    /// manager keeps its previous rules.
    pub fn add_rule(&self, token: impl Into<String>, rule: Rule) -> Result<()> {
        let token = token.into();
        self.publish(|rules| {
            rules.insert(token.clone(), rule);
        })?;
        debug!(token = %token, "Rule added; regex cache invalidated");
        Ok(())
    }

    /// Remove the rule for `token`, if any.
    pub fn remove_rule(&self, token: &str) -> Result<()> {
        self.publish(|rules| {
            rules.shift_remove(token);
        })?;
        debug!(token, "Rule removed; regex cache invalidated");
        Ok(())
    }

    fn publish(&self, edit: impl FnOnce(&mut IndexMap<String, Rule>)) -> Result<()> {
        let _guard = self.writer.lock();
        let mut rules = self.rule_set.load().rules.clone();
        edit(&mut rules);
        let rule_set = RuleSet::compile(&self.tokens, &self.separator, rules)?;
        self.rule_set.store(Arc::new(rule_set));
        Ok(())
    }
}
