//! Validation helper functions for configuration types.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::errors::{NamingError, Result};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier pattern"));

/// True when `name` can be used as a regex capture-group name.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Validate that a string value is not empty.
pub fn validate_non_empty_str(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(NamingError::config_field(
            format!("{field} must be a non-empty string."),
            field,
        ));
    }
    Ok(())
}

/// Validate that a list is not empty.
pub fn validate_non_empty_list<T>(values: &[T], field: &str) -> Result<()> {
    if values.is_empty() {
        return Err(NamingError::config_field(
            format!("{field} cannot be an empty list."),
            field,
        ));
    }
    Ok(())
}

/// Validate that every name is identifier-shaped.
pub fn validate_identifiers<S: AsRef<str>>(names: &[S], field: &str) -> Result<()> {
    if let Some(bad) = names.iter().map(AsRef::as_ref).find(|n| !is_identifier(n)) {
        return Err(NamingError::config_field(
            format!(
                "Token '{bad}' in {field} is not a valid identifier; names must match ^[A-Za-z_][A-Za-z0-9_]*$."
            ),
            bad,
        ));
    }
    Ok(())
}

/// Validate that no name appears twice. The error lists every duplicate, sorted.
pub fn validate_unique<S: AsRef<str>>(names: &[S], field: &str) -> Result<()> {
    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<&str> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !seen.insert(*name))
        .collect();

    if !duplicates.is_empty() {
        return Err(NamingError::config_field(
            format!(
                "Duplicate entries found in {field}: [{}].",
                duplicates.into_iter().collect::<Vec<_>>().join(", ")
            ),
            field,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("descriptor"));
        assert!(is_identifier("_private2"));
        assert!(!is_identifier("2side"));
        assert!(!is_identifier("side-long"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_validate_unique_lists_duplicates() {
        let err = validate_unique(&["side", "usage", "side", "usage", "x"], "tokens").unwrap_err();
        assert!(format!("{err}").contains("[side, usage]"));
        assert!(validate_unique(&["a", "b"], "tokens").is_ok());
    }

    #[test]
    fn test_non_empty_checks() {
        assert!(validate_non_empty_str("", "separator").unwrap_err().is_config());
        assert!(validate_non_empty_list::<String>(&[], "tokens").is_err());
        assert!(validate_identifiers(&["ok", "not ok"], "tokens").is_err());
    }
}
