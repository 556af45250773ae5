//! Value types exchanged with the [`Manager`](super::Manager).

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::normalizers::Normalizer;
use super::rules::Rule;
use super::vocabulary::Label;

/// Mapping from every declared token to its normalized value (`""` when absent).
pub type TokenData = IndexMap<String, String>;

/// A raw token value: plain text or a vocabulary label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    /// Plain string
    Text(String),
    /// Vocabulary member
    Label(Label),
}

impl TokenValue {
    /// The plain string, unwrapping labels.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Label(label) => label.value(),
        }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TokenValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TokenValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for TokenValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<Label> for TokenValue {
    fn from(value: Label) -> Self {
        Self::Label(value)
    }
}

impl From<&Label> for TokenValue {
    fn from(value: &Label) -> Self {
        Self::Label(value.clone())
    }
}

/// Result of [`Manager::parse`](super::Manager::parse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// The name was understood
    Tokens(TokenData),
    /// Neither strategy understood the name; it is returned unchanged
    Unparsed(String),
}

impl Parsed {
    /// Token data, if the name was understood.
    pub fn tokens(&self) -> Option<&TokenData> {
        match self {
            Self::Tokens(data) => Some(data),
            Self::Unparsed(_) => None,
        }
    }

    /// True when the name was understood.
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Tokens(_))
    }
}

/// Input accepted by [`Manager::resolve`](super::Manager::resolve).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameInput {
    /// Token to value mapping, forwarded to `build`
    Mapping(IndexMap<String, TokenValue>),
    /// Positional values, zipped onto the token order
    Sequence(Vec<TokenValue>),
    /// An already assembled name, returned unchanged
    Name(String),
}

impl From<&str> for NameInput {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for NameInput {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<TokenData> for NameInput {
    fn from(value: TokenData) -> Self {
        Self::Mapping(
            value
                .into_iter()
                .map(|(k, v)| (k, TokenValue::Text(v)))
                .collect(),
        )
    }
}

impl From<IndexMap<String, TokenValue>> for NameInput {
    fn from(value: IndexMap<String, TokenValue>) -> Self {
        Self::Mapping(value)
    }
}

impl From<Vec<(&str, &str)>> for NameInput {
    fn from(value: Vec<(&str, &str)>) -> Self {
        Self::Mapping(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), TokenValue::from(v)))
                .collect(),
        )
    }
}

impl From<Vec<&str>> for NameInput {
    fn from(value: Vec<&str>) -> Self {
        Self::Sequence(value.into_iter().map(TokenValue::from).collect())
    }
}

impl From<Vec<String>> for NameInput {
    fn from(value: Vec<String>) -> Self {
        Self::Sequence(value.into_iter().map(TokenValue::from).collect())
    }
}

impl From<Vec<TokenValue>> for NameInput {
    fn from(value: Vec<TokenValue>) -> Self {
        Self::Sequence(value)
    }
}

/// Configuration layered over a manager for a single [`Manager::resolve_with`](super::Manager::resolve_with) call.
#[derive(Clone, Default)]
pub struct Overrides {
    /// Replacement token order
    pub tokens: Option<Vec<String>>,
    /// Replacement rule map
    pub rules: Option<IndexMap<String, Rule>>,
    /// Replacement normalizer map
    pub normalizers: Option<IndexMap<String, Normalizer>>,
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("tokens", &self.tokens)
            .field("rules", &self.rules)
            .field(
                "normalizers",
                &self.normalizers.as_ref().map(|n| n.keys().collect::<Vec<_>>()),
            )
            .finish()
    }
}

impl Overrides {
    /// Replace the token order.
    pub fn tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Set the rule for `token` in the replacement rule map.
    pub fn rule(mut self, token: impl Into<String>, rule: Rule) -> Self {
        self.rules
            .get_or_insert_with(IndexMap::new)
            .insert(token.into(), rule);
        self
    }

    /// Set the normalizer for `token` in the replacement normalizer map.
    pub fn normalizer(mut self, token: impl Into<String>, normalizer: Normalizer) -> Self {
        self.normalizers
            .get_or_insert_with(IndexMap::new)
            .insert(token.into(), normalizer);
        self
    }

    /// True when nothing is overridden.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_none() && self.rules.is_none() && self.normalizers.is_none()
    }
}
