//! Naming convention configuration.
//!
//! [`NamingConfig`] is the declarative form of a convention as it appears in a
//! YAML or JSON file:
//!
//! ```yaml
//! separator: "_"
//! tokens: [descriptor, side, usage]
//! rules:
//!   __global__:
//!     max_length: 80
//!     forbidden_patterns: ["__"]
//!     separator_rule: { type: regex, value: '^[_\-.]$' }
//!   descriptor: { type: regex, value: '^[a-z][a-zA-Z0-9]*$' }
//!   side: { type: from_enums, sources: [Side] }
//! normalizers:
//!   descriptor: descriptor
//!   side: side
//! ```
//!
//! [`NamingConfig::build_manager`] turns it into a ready [`Manager`].

pub mod validation;


use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::{NamingError, Result};
use crate::naming::compiler::{
    compile_rules, GlobalRulesConfig, Registries, RuleDescriptor, RuleEntry, RuleKind,
    GLOBAL_RULES_KEY,
};
use crate::naming::convention::validate_convention;
use crate::naming::manager::Manager;
use crate::naming::normalizers::resolve_normalizers;

pub use validation::{
    is_identifier, validate_identifiers, validate_non_empty_list, validate_non_empty_str,
    validate_unique,
};

/// Declarative naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Separator placed between token values
    #[serde(default = "NamingConfig::default_separator")]
    pub separator: String,

    /// Token order
    pub tokens: Vec<String>,

    /// Token rules plus the mandatory `__global__` entry
    pub rules: IndexMap<String, RuleEntry>,

    /// Token to normalizer name
    #[serde(default)]
    pub normalizers: IndexMap<String, String>,
}

/// Default implementation for [`NamingConfig`]: the stock rigging convention.
impl Default for NamingConfig {
    fn default() -> Self {
        let mut rules = IndexMap::new();
        rules.insert(
            GLOBAL_RULES_KEY.to_string(),
            RuleEntry::Global(GlobalRulesConfig {
                max_length: Self::default_max_length(),
                forbidden_patterns: vec!["__".to_string()],
                separator_rule: Some(RuleDescriptor::regex(r"^[_\-.]$")),
            }),
        );
        rules.insert(
            "descriptor".to_string(),
            RuleEntry::Token(RuleDescriptor::regex("^[a-z][a-zA-Z0-9]*$")),
        );
        rules.insert(
            "side".to_string(),
            RuleEntry::Token(RuleDescriptor::from_enums(["Side"])),
        );
        rules.insert(
            "usage".to_string(),
            RuleEntry::Token(RuleDescriptor::from_enums(["Usage"])),
        );

        let mut normalizers = IndexMap::new();
        normalizers.insert("descriptor".to_string(), "descriptor".to_string());
        normalizers.insert("side".to_string(), "side".to_string());

        Self {
            separator: Self::default_separator(),
            tokens: vec!["descriptor".into(), "side".into(), "usage".into()],
            rules,
            normalizers,
        }
    }
}

/// Default value providers for [`NamingConfig`].
impl NamingConfig {
    fn default_separator() -> String {
        "_".to_string()
    }

    const fn default_max_length() -> usize {
        80
    }
}

impl NamingConfig {
    /// Parse a convention from YAML
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(Into::into)
    }

    /// Parse a convention from JSON
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Into::into)
    }

    /// Load a convention from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            NamingError::io(format!("Failed to read naming config: {}", path.display()), e)
        })?;

        Self::from_yaml_str(&content)
    }

    /// Serialize the convention to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Save the convention to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = self.to_yaml_string()?;
        std::fs::write(&path, content).map_err(|e| {
            NamingError::io(
                format!("Failed to write naming config: {}", path.display()),
                e,
            )
        })
    }

    /// Shape checks that need no registries.
    pub fn validate(&self) -> Result<()> {
        validate_non_empty_str(&self.separator, "separator")?;
        validate_non_empty_list(&self.tokens, "tokens")?;

        match self.rules.get(GLOBAL_RULES_KEY) {
            Some(RuleEntry::Global(_)) => {}
            Some(RuleEntry::Token(_)) => {
                return Err(NamingError::config_field(
                    format!("'{GLOBAL_RULES_KEY}' must hold max_length, forbidden_patterns and separator_rule, not a token rule."),
                    GLOBAL_RULES_KEY,
                ))
            }
            None => {
                return Err(NamingError::config_field(
                    format!("Naming rules must contain a '{GLOBAL_RULES_KEY}' entry."),
                    GLOBAL_RULES_KEY,
                ))
            }
        }

        for (token, entry) in &self.rules {
            if token == GLOBAL_RULES_KEY {
                continue;
            }
            match entry {
                RuleEntry::Token(descriptor) if RuleKind::parse(&descriptor.kind).is_some() => {}
                RuleEntry::Token(descriptor) => {
                    return Err(NamingError::config_field(
                        format!(
                            "Unknown rule type '{}' for token '{token}'. Valid types are: [{}].",
                            descriptor.kind,
                            RuleKind::ALL.map(RuleKind::as_str).join(", ")
                        ),
                        format!("rules.{token}"),
                    ))
                }
                RuleEntry::Global(_) => {
                    return Err(NamingError::config_field(
                        format!("Rule for token '{token}' is missing its 'type'."),
                        format!("rules.{token}"),
                    ))
                }
            }
        }

        Ok(())
    }

    /// Compile rules, resolve normalizers, check the convention and construct a [`Manager`].
    pub fn build_manager(&self, registries: &Registries) -> Result<Manager> {
        self.validate()?;

        let compiled = compile_rules(&self.rules, registries)?;
        let normalizers = resolve_normalizers(&self.normalizers, &registries.normalizers)?;
        validate_convention(
            &self.tokens,
            &self.separator,
            &compiled.token_rules,
            &compiled.global_rules,
        )?;

        debug!(
            tokens = ?self.tokens,
            separator = %self.separator,
            "Building naming manager"
        );
        Manager::new(
            self.tokens.clone(),
            self.separator.clone(),
            compiled.token_rules,
            normalizers,
            compiled.global_rules,
        )
    }
}
