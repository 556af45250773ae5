//! Structural checks over an assembled convention.

use indexmap::IndexMap;
use tracing::warn;

use super::rules::{GlobalRules, Rule};
use crate::core::config::validation::{
    validate_identifiers, validate_non_empty_list, validate_non_empty_str, validate_unique,
};
use crate::core::errors::{NamingError, Result};

/// Check a convention, failing on the first violation.
///
/// Tokens without a rule accept any value; they are reported with a warning.
pub fn validate_convention(
    tokens: &[String],
    separator: &str,
    rules: &IndexMap<String, Rule>,
    global_rules: &GlobalRules,
) -> Result<()> {
    validate_non_empty_list(tokens, "tokens")?;
    validate_unique(tokens, "tokens")?;
    validate_non_empty_str(separator, "separator")?;

    if let Some(rule) = &global_rules.separator_rule {
        if !rule.validate(separator) {
            return Err(NamingError::config_field(
                format!("Separator '{separator}' does not satisfy the separator rule."),
                "separator",
            ));
        }
    }

    validate_identifiers(tokens, "tokens")?;

    for token in tokens.iter().filter(|t| !rules.contains_key(t.as_str())) {
        warn!(token = %token, "Token has no rule and will accept any value");
    }

    Ok(())
}
