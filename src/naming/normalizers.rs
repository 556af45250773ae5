//! Token normalizers.
//!
//! A normalizer turns a raw value into the canonical string stored in a name.
//! Every builtin returns `""` for empty input and is idempotent on its own output.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::text;
use crate::core::errors::{NamingError, Result};

/// Pure `(raw) -> normalized` transform.
pub type Normalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Name to normalizer lookup used when resolving a convention's normalizer map.
#[derive(Clone, Default)]
pub struct NormalizerRegistry {
    entries: BTreeMap<String, Normalizer>,
}

impl fmt::Debug for NormalizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizerRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl NormalizerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the stock normalizer catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("side", side);
        registry.register("descriptor", text::to_camel_case);
        registry.register("type", text::to_camel_case);
        registry.register("pascal_case", text::to_pascal_case);
        registry.register("snake_case", text::to_snake_case);
        registry.register("kebab_case", text::to_kebab_case);
        registry.register("clean", |v: &str| text::clean_text(v, "_"));
        registry.register("version", version);
        registry.register("upper", str::to_uppercase);
        registry.register("lower", str::to_lowercase);
        registry.register("capitalize", text::capitalize_first);
        registry.register("strip_digits", text::strip_digits);
        registry.register("strip_namespace", |v: &str| {
            text::strip_namespace(v, ":").to_string()
        });
        registry.register("base_name", |v: &str| text::base_name(v, "|").to_string());
        registry
    }

    /// Register (or replace) a normalizer. Empty input never reaches `normalizer`.
    pub fn register<F>(&mut self, name: impl Into<String>, normalizer: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let wrapped = move |value: &str| {
            if value.is_empty() {
                String::new()
            } else {
                normalizer(value)
            }
        };
        self.entries.insert(name.into(), Arc::new(wrapped));
    }

    /// Normalizer registered under `name`.
    pub fn get(&self, name: &str) -> Option<Normalizer> {
        self.entries.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Resolve a `token -> normalizer name` map against `registry`.
pub fn resolve_normalizers(
    names: &IndexMap<String, String>,
    registry: &NormalizerRegistry,
) -> Result<IndexMap<String, Normalizer>> {
    names
        .iter()
        .map(|(token, name)| {
            let normalizer = registry.get(name).ok_or_else(|| {
                NamingError::config_field(
                    format!(
                        "Unknown normalizer '{name}' for token '{token}'. Available normalizers: [{}].",
                        registry.names().collect::<Vec<_>>().join(", ")
                    ),
                    token.as_str(),
                )
            })?;
            Ok((token.clone(), normalizer))
        })
        .collect()
}

fn side(value: &str) -> String {
    if let Some(short) = short_side(value) {
        return short.to_string();
    }
    let camel = text::to_camel_case(value);
    short_side(&camel).map_or(camel, str::to_string)
}

fn short_side(value: &str) -> Option<&'static str> {
    match value.to_lowercase().as_str() {
        "l" | "left" => Some("l"),
        "r" | "right" => Some("r"),
        "c" | "center" => Some("c"),
        "m" | "middle" => Some("m"),
        _ => None,
    }
}

fn version(value: &str) -> String {
    if let Some(number) = text::get_version(value) {
        return format!("v{number:03}");
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return format!("v{value:0>3}");
    }
    value.to_string()
}
