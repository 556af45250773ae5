//! Property-based checks for the naming engine.
//!
//! - Build then extract reconstructs the values that went in, including
//!   across multi-character separators
//! - Complete names built from valid values always validate
//! - The synthesized regex never accepts empty separator slots
//! - Builtin normalizers are idempotent
//! - Separator exclusion fragments reject every string containing the separator

use std::sync::Arc;

use indexmap::IndexMap;
use proptest::prelude::*;
use regex::Regex;

use rig_naming::naming::pattern::excluding_fragment;
use rig_naming::naming::{
    FixedSetRule, GlobalRules, Manager, NormalizerRegistry, PatternRule, RegexOptions, Rule,
};

const TOKENS: [&str; 3] = ["descriptor", "side", "usage"];

fn plain_manager() -> Manager {
    let mut rules: IndexMap<String, Rule> = IndexMap::new();
    rules.insert(
        "descriptor".into(),
        Arc::new(PatternRule::new("^[a-z][a-z0-9]*$").unwrap()),
    );
    rules.insert("side".into(), Arc::new(FixedSetRule::new(["l", "r", "c"])));

    Manager::new(
        TOKENS.iter().map(|t| (*t).to_string()).collect(),
        "_",
        rules,
        IndexMap::new(),
        GlobalRules::default(),
    )
    .unwrap()
}

/// Token values filled left to right; `count` says how many are present.
fn token_values() -> impl Strategy<Value = Vec<String>> {
    (
        "[a-z][a-z0-9]{0,8}",
        prop_oneof![Just("l"), Just("r"), Just("c")],
        "[a-z]{1,6}",
        1usize..=3,
    )
        .prop_map(|(descriptor, side, usage, count)| {
            vec![descriptor, side.to_string(), usage]
                .into_iter()
                .take(count)
                .collect()
        })
}

#[cfg(test)]
mod property_based_tests {
    use super::*;

    proptest! {
        /// Property: extracting a freshly built name gives back every value, absent tokens as ""
        #[test]
        fn prop_build_then_extract_round_trips(values in token_values()) {
            let manager = plain_manager();
            let name = manager
                .build(TOKENS.iter().copied().zip(values.iter().map(String::as_str)))
                .unwrap();

            let data = manager.get_data(&name);
            for (i, token) in TOKENS.iter().enumerate() {
                let expected = values.get(i).map_or("", String::as_str);
                prop_assert_eq!(data[*token].as_str(), expected, "token {} of {}", token, name);
            }
        }

        /// Property: with a two-character separator, values round-trip as long as
        /// none ends in a separator prefix that would overlap the next separator
        #[test]
        fn prop_multi_char_separator_round_trips(
            first in "[a-z_]{1,5}",
            second in "[a-z_]{1,5}"
        ) {
            prop_assume!(format!("{first}__").find("__") == Some(first.len()));
            prop_assume!(!second.contains("__"));

            let manager = Manager::new(
                vec!["first".to_string(), "second".to_string()],
                "__",
                IndexMap::new(),
                IndexMap::new(),
                GlobalRules::default(),
            )
            .unwrap();
            let name = manager
                .build([("first", first.as_str()), ("second", second.as_str())])
                .unwrap();

            let data = manager.get_data(&name);
            prop_assert_eq!(data["first"].as_str(), first.as_str(), "name {}", name);
            prop_assert_eq!(data["second"].as_str(), second.as_str(), "name {}", name);
            prop_assert!(manager.is_valid(&name));
        }

        /// Property: a name carrying every token validates
        #[test]
        fn prop_complete_names_are_valid(
            descriptor in "[a-z][a-z0-9]{0,8}",
            side in prop_oneof![Just("l"), Just("r"), Just("c")],
            usage in "[a-z]{1,6}"
        ) {
            let manager = plain_manager();
            let name = manager
                .build([("descriptor", descriptor.as_str()), ("side", side), ("usage", usage.as_str())])
                .unwrap();
            prop_assert!(manager.is_valid(&name), "{} should be valid", name);
        }

        /// Property: empty separator slots are never accepted
        #[test]
        fn prop_regex_rejects_empty_slots(candidate in "[a-z_]{0,12}") {
            let manager = plain_manager();
            let lenient = Regex::new(&manager.get_matching_regex(RegexOptions::default())).unwrap();

            let empty_slot = candidate.contains("__")
                || candidate.starts_with('_')
                || candidate.ends_with('_');
            if empty_slot {
                prop_assert!(!lenient.is_match(&candidate), "{} matched", candidate);
                prop_assert!(!manager.is_valid(&candidate));
            }
        }

        /// Property: applying a builtin normalizer twice changes nothing
        #[test]
        fn prop_normalizers_are_idempotent(raw in "[a-zA-Z0-9 _:|.-]{0,24}") {
            let registry = NormalizerRegistry::with_builtins();
            for name in registry.names() {
                let normalizer = registry.get(name).unwrap();
                let once = normalizer(&raw);
                prop_assert_eq!(normalizer(&once), once.clone(), "normalizer {} on {:?}", name, raw);
            }
        }

        /// Property: a multi-character separator exclusion matches exactly the
        /// non-empty strings that do not contain the separator
        #[test]
        fn prop_excluding_fragment_is_exact(
            separator in prop_oneof![Just("__"), Just("::"), Just("ab"), Just("aba"), Just("-|-")],
            candidate in "[ab_:|x-]{0,10}"
        ) {
            let re = Regex::new(&format!("^(?:{})$", excluding_fragment(separator))).unwrap();
            let expected = !candidate.is_empty() && !candidate.contains(separator);
            prop_assert_eq!(re.is_match(&candidate), expected, "separator {:?} on {:?}", separator, candidate);
        }
    }
}
