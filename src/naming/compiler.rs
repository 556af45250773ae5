//! Rule compilation: declarative rule descriptors into executable [`Rule`]s.
//!
//! A convention's `rules` table maps token names to [`RuleDescriptor`]s and must
//! carry one `__global__` entry holding the [`GlobalRulesConfig`]. Compilation
//! resolves enumerated sources and predicate references against [`Registries`]
//! supplied by the caller.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalizers::NormalizerRegistry;
use super::predicates::PredicateRegistry;
use super::rules::{FixedSetRule, GlobalRules, PatternRule, PredicateRule, Rule};
use super::vocabulary::VocabularyRegistry;
use crate::core::errors::{NamingError, Result};

/// Key of the mandatory global constraints entry in a rules table.
pub const GLOBAL_RULES_KEY: &str = "__global__";

/// Rule kinds understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Full-match regular expression (`value` is a string)
    Regex,
    /// Explicit set of allowed values (`value` is a list)
    List,
    /// Union of the members of registered vocabularies (`sources`)
    FromEnums,
    /// Registered predicate referenced by dotted path (`value` is a string)
    Callable,
}

impl RuleKind {
    /// Every kind, in the order used for error messages.
    pub const ALL: [RuleKind; 4] = [Self::Callable, Self::FromEnums, Self::List, Self::Regex];

    /// Wire name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::List => "list",
            Self::FromEnums => "from_enums",
            Self::Callable => "callable",
        }
    }

    /// Parse a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a rule descriptor: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// Pattern or dotted reference
    Text(String),
    /// Allowed values
    List(Vec<String>),
}

/// Declarative description of one token rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDescriptor {
    /// Kind tag (`regex`, `list`, `from_enums`, `callable`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleValue>,
    /// Vocabulary names for `from_enums`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl RuleDescriptor {
    /// `regex` descriptor.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Regex.as_str().to_string(),
            value: Some(RuleValue::Text(pattern.into())),
            sources: None,
        }
    }

    /// `list` descriptor.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RuleKind::List.as_str().to_string(),
            value: Some(RuleValue::List(values.into_iter().map(Into::into).collect())),
            sources: None,
        }
    }

    /// `from_enums` descriptor.
    pub fn from_enums<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RuleKind::FromEnums.as_str().to_string(),
            value: None,
            sources: Some(sources.into_iter().map(Into::into).collect()),
        }
    }

    /// `callable` descriptor.
    pub fn callable(reference: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::Callable.as_str().to_string(),
            value: Some(RuleValue::Text(reference.into())),
            sources: None,
        }
    }
}

/// Declarative global constraints (the `__global__` entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalRulesConfig {
    /// Maximum name length; `0` disables the check
    pub max_length: usize,
    /// Substrings forbidden in assembled names
    #[serde(default)]
    pub forbidden_patterns: Vec<String>,
    /// Rule the separator must satisfy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator_rule: Option<RuleDescriptor>,
}

/// One entry of a rules table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    /// Per-token rule
    Token(RuleDescriptor),
    /// Global constraints, only valid under [`GLOBAL_RULES_KEY`]
    Global(GlobalRulesConfig),
}

/// Lookup tables the compiler and normalizer resolution draw from.
#[derive(Debug, Clone)]
pub struct Registries {
    /// Sources for `from_enums` rules
    pub vocabularies: VocabularyRegistry,
    /// Targets of `callable` rules
    pub predicates: PredicateRegistry,
    /// Normalizers referenced by name
    pub normalizers: NormalizerRegistry,
}

impl Registries {
    /// Registries holding every builtin vocabulary, predicate and normalizer.
    pub fn with_builtins() -> Self {
        Self {
            vocabularies: VocabularyRegistry::with_builtins(),
            predicates: PredicateRegistry::with_builtins(),
            normalizers: NormalizerRegistry::with_builtins(),
        }
    }

    /// Registries with nothing registered.
    pub fn empty() -> Self {
        Self {
            vocabularies: VocabularyRegistry::new(),
            predicates: PredicateRegistry::new(),
            normalizers: NormalizerRegistry::new(),
        }
    }
}

/// Default implementation for [`Registries`]: the builtin catalog.
impl Default for Registries {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Output of [`compile_rules`].
#[derive(Debug, Clone)]
pub struct CompiledRules {
    /// Token name to rule, in declaration order
    pub token_rules: IndexMap<String, Rule>,
    /// Compiled global constraints
    pub global_rules: GlobalRules,
}

/// Compile a rules table.
pub fn compile_rules(
    entries: &IndexMap<String, RuleEntry>,
    registries: &Registries,
) -> Result<CompiledRules> {
    let global_rules = match entries.get(GLOBAL_RULES_KEY) {
        Some(RuleEntry::Global(config)) => compile_global_rules(config, registries)?,
        _ => {
            return Err(NamingError::config_field(
                format!(
                    "Configuration is missing or invalid for '{GLOBAL_RULES_KEY}' in the naming rules; expected max_length, forbidden_patterns and an optional separator_rule."
                ),
                GLOBAL_RULES_KEY,
            ))
        }
    };

    let mut token_rules = IndexMap::new();
    for (token, entry) in entries {
        if token == GLOBAL_RULES_KEY {
            continue;
        }
        let RuleEntry::Token(descriptor) = entry else {
            return Err(NamingError::config_field(
                format!("Expected a rule descriptor with a 'type' for token '{token}', got global constraints."),
                token.as_str(),
            ));
        };
        token_rules.insert(token.clone(), compile_descriptor(token, descriptor, registries)?);
    }

    debug!(rules = token_rules.len(), "Compiled naming rules");
    Ok(CompiledRules {
        token_rules,
        global_rules,
    })
}

/// Compile the `__global__` entry.
pub fn compile_global_rules(
    config: &GlobalRulesConfig,
    registries: &Registries,
) -> Result<GlobalRules> {
    let separator_rule = config
        .separator_rule
        .as_ref()
        .map(|descriptor| compile_descriptor("separator_rule", descriptor, registries))
        .transpose()?;

    Ok(GlobalRules {
        max_length: config.max_length,
        forbidden_patterns: config.forbidden_patterns.iter().cloned().collect::<BTreeSet<_>>(),
        separator_rule,
    })
}

/// Compile a single descriptor for `token`.
pub fn compile_descriptor(
    token: &str,
    descriptor: &RuleDescriptor,
    registries: &Registries,
) -> Result<Rule> {
    let kind = RuleKind::parse(&descriptor.kind).ok_or_else(|| {
        NamingError::config_field(
            format!(
                "Unknown rule type '{}' for token '{token}'. Valid types are: [{}].",
                descriptor.kind,
                RuleKind::ALL.map(RuleKind::as_str).join(", ")
            ),
            token,
        )
    })?;

    let rule: Rule = match kind {
        RuleKind::Regex => {
            let pattern = text_value(token, kind, descriptor)?;
            let rule = PatternRule::new(pattern).map_err(|err| {
                NamingError::config_field(format!("Token '{token}': {}", message_of(&err)), token)
            })?;
            Arc::new(rule)
        }
        RuleKind::List => match &descriptor.value {
            Some(RuleValue::List(values)) => Arc::new(FixedSetRule::new(values.iter().cloned())),
            _ => {
                return Err(NamingError::config_field(
                    format!("List rule for token '{token}' requires a list 'value'."),
                    token,
                ))
            }
        },
        RuleKind::FromEnums => {
            let sources = descriptor
                .sources
                .as_deref()
                .filter(|sources| !sources.is_empty())
                .ok_or_else(|| {
                    NamingError::config_field(
                        format!(
                            "'sources' for the 'from_enums' rule of token '{token}' must be a non-empty list of enumeration names."
                        ),
                        token,
                    )
                })?;

            let mut values = BTreeSet::new();
            for source in sources {
                let vocabulary = registries.vocabularies.resolve(source, token)?;
                values.extend(vocabulary.members().iter().cloned());
            }
            Arc::new(FixedSetRule::new(values))
        }
        RuleKind::Callable => {
            let reference = text_value(token, kind, descriptor)?;
            let predicate = registries.predicates.resolve(reference, token)?;
            Arc::new(PredicateRule::new(predicate, reference))
        }
    };

    Ok(rule)
}

fn text_value<'a>(token: &str, kind: RuleKind, descriptor: &'a RuleDescriptor) -> Result<&'a str> {
    match &descriptor.value {
        Some(RuleValue::Text(text)) => Ok(text),
        _ => Err(NamingError::config_field(
            format!("{kind} rule for token '{token}' requires a string 'value'."),
            token,
        )),
    }
}

fn message_of(err: &NamingError) -> String {
    match err {
        NamingError::Config { message, .. } | NamingError::Validation { message, .. } => {
            message.clone()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: Vec<(&str, RuleEntry)>) -> IndexMap<String, RuleEntry> {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn global(max_length: usize) -> RuleEntry {
        RuleEntry::Global(GlobalRulesConfig {
            max_length,
            forbidden_patterns: vec!["__".to_string()],
            separator_rule: Some(RuleDescriptor::regex(r"^[_\-.]$")),
        })
    }

    #[test]
    fn test_compile_all_kinds() {
        let registries = Registries::with_builtins();
        let entries = table(vec![
            (GLOBAL_RULES_KEY, global(80)),
            ("descriptor", RuleEntry::Token(RuleDescriptor::regex("^[a-z][a-zA-Z0-9]*$"))),
            ("side", RuleEntry::Token(RuleDescriptor::from_enums(["Side"]))),
            ("usage", RuleEntry::Token(RuleDescriptor::list(["jnt", "ctl"]))),
            ("check", RuleEntry::Token(RuleDescriptor::callable("naming.checks.is_alpha"))),
        ]);

        let compiled = compile_rules(&entries, &registries).unwrap();
        assert_eq!(
            compiled.token_rules.keys().collect::<Vec<_>>(),
            ["descriptor", "side", "usage", "check"]
        );
        assert!(compiled.token_rules["descriptor"].validate("arm"));
        assert!(compiled.token_rules["side"].validate("m"));
        assert!(!compiled.token_rules["side"].validate("left"));
        assert!(compiled.token_rules["usage"].validate("ctl"));
        assert!(!compiled.token_rules["check"].validate("arm1"));

        assert_eq!(compiled.global_rules.max_length, 80);
        assert!(compiled.global_rules.forbidden_patterns.contains("__"));
        assert!(compiled.global_rules.separator_rule.as_ref().unwrap().validate("_"));
    }

    #[test]
    fn test_from_enums_unions_sources() {
        let registries = Registries::with_builtins();
        let rule = compile_descriptor(
            "side",
            &RuleDescriptor::from_enums(["Side", "Position"]),
            &registries,
        )
        .unwrap();
        assert!(rule.validate("l"));
        assert!(rule.validate("left"));
        assert!(rule.validate("front"));
        assert!(!rule.validate("jnt"));
    }

    #[test]
    fn test_missing_global_entry() {
        let entries = table(vec![("side", RuleEntry::Token(RuleDescriptor::list(["l"])))]);
        let err = compile_rules(&entries, &Registries::with_builtins()).unwrap_err();
        assert!(err.is_config());
        assert!(format!("{err}").contains(GLOBAL_RULES_KEY));
    }

    #[test]
    fn test_unknown_kind_names_token_and_valid_kinds() {
        let descriptor = RuleDescriptor {
            kind: "glob".to_string(),
            value: Some(RuleValue::Text("*".to_string())),
            sources: None,
        };
        let err = compile_descriptor("usage", &descriptor, &Registries::with_builtins()).unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("'glob'"));
        assert!(message.contains("'usage'"));
        assert!(message.contains("callable, from_enums, list, regex"));
    }

    #[test]
    fn test_malformed_payloads() {
        let registries = Registries::with_builtins();
        let bad_regex = RuleDescriptor {
            kind: "regex".to_string(),
            value: Some(RuleValue::List(vec!["a".to_string()])),
            sources: None,
        };
        assert!(compile_descriptor("t", &bad_regex, &registries).unwrap_err().is_config());

        let bad_list = RuleDescriptor {
            kind: "list".to_string(),
            value: Some(RuleValue::Text("a".to_string())),
            sources: None,
        };
        assert!(compile_descriptor("t", &bad_list, &registries).is_err());

        let no_sources = RuleDescriptor::from_enums(Vec::<String>::new());
        assert!(compile_descriptor("t", &no_sources, &registries).is_err());

        let err = compile_descriptor("t", &RuleDescriptor::regex("(oops"), &registries).unwrap_err();
        assert_eq!(err.field(), Some("t"));
    }

    #[test]
    fn test_scalar_source_is_rejected() {
        let err = compile_descriptor(
            "color",
            &RuleDescriptor::from_enums(["Matrix"]),
            &Registries::with_builtins(),
        )
        .unwrap_err();
        assert!(format!("{err}").contains("not an enumeration"));

        let rule = compile_descriptor(
            "color",
            &RuleDescriptor::from_enums(["ColorIndex"]),
            &Registries::with_builtins(),
        )
        .unwrap();
        assert!(rule.validate("13"));
        assert!(!rule.validate("32"));
    }

    #[test]
    fn test_unresolvable_callable() {
        let err = compile_descriptor(
            "descriptor",
            &RuleDescriptor::callable("naming.checks.nope"),
            &Registries::with_builtins(),
        )
        .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_rule_entry_deserialization() {
        let yaml = r#"
__global__:
  max_length: 40
  forbidden_patterns: ["__"]
side:
  type: list
  value: [l, r]
descriptor:
  type: regex
  value: "^[a-z]+$"
"#;
        let entries: IndexMap<String, RuleEntry> = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(entries[GLOBAL_RULES_KEY], RuleEntry::Global(_)));
        assert_eq!(entries["side"], RuleEntry::Token(RuleDescriptor::list(["l", "r"])));
        assert_eq!(entries["descriptor"], RuleEntry::Token(RuleDescriptor::regex("^[a-z]+$")));
    }

    #[test]
    fn test_rule_kind_parse() {
        assert_eq!(RuleKind::parse("from_enums"), Some(RuleKind::FromEnums));
        assert_eq!(RuleKind::parse("pattern"), None);
        assert_eq!(RuleKind::Callable.to_string(), "callable");
    }
}
