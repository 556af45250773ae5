//! Enumerated vocabularies and labelled values.
//!
//! A [`Vocabulary`] is a named, ordered set of string members with an optional
//! mirror table (`l` mirrors to `r`). Vocabularies feed `from_enums` rules, and
//! their members can be handed to the manager as [`Label`]s interchangeably
//! with plain strings.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::errors::{NamingError, Result};

/// A vocabulary member carrying the name of the vocabulary it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    vocabulary: String,
    value: String,
}

impl Label {
    /// Create a label without looking it up in a registry.
    pub fn new(vocabulary: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            vocabulary: vocabulary.into(),
            value: value.into(),
        }
    }

    /// The plain string value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Name of the vocabulary this label belongs to.
    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A named enumeration of string members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    name: String,
    members: Vec<String>,
    mirrors: HashMap<String, String>,
}

impl Vocabulary {
    /// Create a vocabulary from its members. Duplicate members are dropped.
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for member in members {
            let member = member.into();
            if !unique.contains(&member) {
                unique.push(member);
            }
        }
        Self {
            name: name.into(),
            members: unique,
            mirrors: HashMap::new(),
        }
    }

    /// Declare mirror pairs. Each pair is registered in both directions.
    pub fn with_mirrors<I, A, B>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        for (a, b) in pairs {
            let (a, b) = (a.into(), b.into());
            self.mirrors.insert(a.clone(), b.clone());
            self.mirrors.insert(b, a);
        }
        self
    }

    /// Vocabulary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// True when `value` is a member.
    pub fn contains(&self, value: &str) -> bool {
        self.members.iter().any(|m| m == value)
    }

    /// Look up a member as a [`Label`].
    pub fn label(&self, value: &str) -> Option<Label> {
        self.contains(value).then(|| Label::new(&self.name, value))
    }

    /// Mirrored counterpart of `value`, or `value` itself when none is declared.
    pub fn mirror<'a>(&'a self, value: &'a str) -> &'a str {
        self.mirrors.get(value).map_or(value, String::as_str)
    }
}

/// Registry entry: either a string enumeration or a named constant table that
/// cannot act as a rule source.
#[derive(Debug, Clone)]
enum Entry {
    Enumeration(Vocabulary),
    Scalar,
}

/// Name to vocabulary lookup used when compiling `from_enums` rules.
#[derive(Debug, Clone, Default)]
pub struct VocabularyRegistry {
    entries: IndexMap<String, Entry>,
}

impl VocabularyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the stock rigging vocabularies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            Vocabulary::new(
                "Side",
                ["l", "r", "c", "m", "left", "right", "center", "middle"],
            )
            .with_mirrors([("l", "r"), ("left", "right")]),
        );
        registry.register(
            Vocabulary::new(
                "Position",
                ["front", "back", "up", "down", "middle", "internal", "external"],
            )
            .with_mirrors([("front", "back"), ("up", "down"), ("internal", "external")]),
        );
        registry.register(Vocabulary::new(
            "Usage",
            [
                "jnt", "ctl", "grp", "loc", "ik", "fk", "geo", "crv", "guides", "cmp", "in",
                "out", "controls", "logic", "deform", "settings", "local",
            ],
        ));
        registry.register(
            Vocabulary::new("Axis", ["X", "Y", "Z", "-X", "-Y", "-Z"])
                .with_mirrors([("X", "-X"), ("Y", "-Y"), ("Z", "-Z")]),
        );
        registry.register(Vocabulary::new(
            "RotateOrder",
            ["xyz", "yzx", "zxy", "xzy", "yxz", "zyx"],
        ));
        registry.register(Vocabulary::new("ColorIndex", (0..=31).map(|i| i.to_string())));
        registry.register(Vocabulary::new("VectorIndex", ["0", "1", "2", "3"]));
        registry.register(Vocabulary::new(
            "Extension",
            ["ma", "mb", "obj", "fbx", "abc", "json", "xml", "py", "mel", "png", "jpg", "exr", "tif"],
        ));
        registry.register_scalar("Matrix");
        registry
    }

    /// Register (or replace) an enumeration under its own name.
    pub fn register(&mut self, vocabulary: Vocabulary) {
        self.entries
            .insert(vocabulary.name().to_string(), Entry::Enumeration(vocabulary));
    }

    /// Register a name that exists but is not a string enumeration.
    pub fn register_scalar(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), Entry::Scalar);
    }

    /// Enumeration registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Vocabulary> {
        match self.entries.get(name) {
            Some(Entry::Enumeration(vocabulary)) => Some(vocabulary),
            _ => None,
        }
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolve a rule source, failing when it is missing or not an enumeration.
    pub fn resolve(&self, name: &str, token: &str) -> Result<&Vocabulary> {
        match self.entries.get(name) {
            Some(Entry::Enumeration(vocabulary)) => Ok(vocabulary),
            Some(Entry::Scalar) => Err(NamingError::config_field(
                format!(
                    "Source '{name}' for token '{token}' is not an enumeration and cannot provide values."
                ),
                token,
            )),
            None => Err(NamingError::config_field(
                format!(
                    "Unknown enumeration source '{name}' for token '{token}'. Available sources: [{}].",
                    self.names().collect::<Vec<_>>().join(", ")
                ),
                token,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror() {
        let registry = VocabularyRegistry::with_builtins();
        let side = registry.get("Side").unwrap();
        assert_eq!(side.mirror("l"), "r");
        assert_eq!(side.mirror("r"), "l");
        assert_eq!(side.mirror("c"), "c");
        assert_eq!(side.mirror("left"), "right");
        assert_eq!(side.mirror("middle"), "middle");

        let position = registry.get("Position").unwrap();
        assert!(position.contains("middle"));
        assert_eq!(position.mirror("middle"), "middle");
        assert_eq!(position.mirror("up"), "down");

        let axis = registry.get("Axis").unwrap();
        assert_eq!(axis.mirror("-Y"), "Y");
    }

    fn side_label(registry: &VocabularyRegistry, value: &str) -> Label {
        registry.get("Side").unwrap().label(value).unwrap()
    }

    #[test]
    fn test_label() {
        let registry = VocabularyRegistry::with_builtins();
        let label = registry.get("Side").unwrap().label("l").unwrap();
        assert_eq!(label.value(), "l");
        assert_eq!(label.vocabulary(), "Side");
        assert_eq!(label.to_string(), "l");
        assert_eq!(side_label(&registry, "left").vocabulary(), "Side");
        assert!(registry.get("Side").unwrap().label("front").is_none());
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let vocab = Vocabulary::new("Dup", ["a", "b", "a"]);
        assert_eq!(vocab.members(), ["a", "b"]);
    }

    #[test]
    fn test_resolve_errors() {
        let registry = VocabularyRegistry::with_builtins();
        let err = registry.resolve("Nope", "side").unwrap_err();
        assert!(err.is_config());
        assert!(format!("{err}").contains("Nope"));

        let err = registry.resolve("Matrix", "color").unwrap_err();
        assert!(format!("{err}").contains("not an enumeration"));
        assert_eq!(err.field(), Some("color"));

        assert!(registry.resolve("Usage", "usage").is_ok());
        assert!(registry.resolve("ColorIndex", "color").unwrap().contains("17"));
        assert!(registry.resolve("RotateOrder", "order").unwrap().contains("zxy"));
    }
}
