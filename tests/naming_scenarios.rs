//! End-to-end naming scenarios.
//!
//! Covers the rigging convention `[descriptor, side, usage]`:
//! - Building from partial mappings, labels and sequences
//! - Parsing, validation and diagnostics
//! - Round-trip updates
//! - Rule mutation while other threads read

use std::sync::Arc;
use std::thread;

use indexmap::IndexMap;

use rig_naming::naming::{
    FixedSetRule, GlobalRules, Manager, NormalizerRegistry, Overrides, Parsed, PatternRule,
    PredicateRule, RegexOptions, Rule, VocabularyRegistry,
};
use rig_naming::{NamingConfig, Registries, TokenValue};

fn rig_manager() -> Manager {
    let mut rules: IndexMap<String, Rule> = IndexMap::new();
    rules.insert(
        "descriptor".into(),
        Arc::new(PatternRule::new("^[a-z][a-zA-Z0-9]*$").unwrap()),
    );
    rules.insert("side".into(), Arc::new(FixedSetRule::new(["l", "r", "c"])));

    let registry = NormalizerRegistry::with_builtins();
    let mut normalizers = IndexMap::new();
    normalizers.insert("descriptor".to_string(), registry.get("descriptor").unwrap());
    normalizers.insert("side".to_string(), registry.get("side").unwrap());

    Manager::new(
        vec!["descriptor".into(), "side".into(), "usage".into()],
        "_",
        rules,
        normalizers,
        GlobalRules::with_max_length(80),
    )
    .unwrap()
}

#[cfg(test)]
mod build_tests {
    use super::*;

    #[test]
    fn test_build_full_name() {
        let manager = rig_manager();
        let name = manager
            .build([("descriptor", "arm"), ("side", "l"), ("usage", "jnt")])
            .unwrap();
        assert_eq!(name, "arm_l_jnt");
    }

    #[test]
    fn test_build_normalizes_values() {
        let manager = rig_manager();
        let name = manager
            .build([("descriptor", "Arm Upper"), ("side", "left")])
            .unwrap();
        assert_eq!(name, "armUpper_l");
    }

    #[test]
    fn test_build_accepts_vocabulary_labels() {
        let manager = rig_manager();
        let vocabularies = VocabularyRegistry::with_builtins();
        let right = vocabularies.get("Side").unwrap().label("r").unwrap();

        let name = manager
            .build([
                ("descriptor", TokenValue::from("leg")),
                ("side", TokenValue::from(right)),
            ])
            .unwrap();
        assert_eq!(name, "leg_r");
    }

    #[test]
    fn test_build_rejects_unknown_token() {
        let manager = rig_manager();
        let err = manager.build([("side", "l"), ("extra", "x")]).unwrap_err();
        assert!(err.is_validation());
        assert!(format!("{err}").contains("extra"));
    }

    #[test]
    fn test_build_reports_length_limit() {
        let manager = rig_manager();
        let descriptor = format!("a{}", "b".repeat(76));
        let err = manager
            .build([("descriptor", descriptor.as_str()), ("side", "l"), ("usage", "x")])
            .unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("maximum length of 80"), "{message}");
        assert!(message.contains("got 81"), "{message}");
    }
}

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_lenient_regex_tokens_optional_right_to_left() {
        let manager = rig_manager();
        let re = regex::Regex::new(&manager.get_matching_regex(RegexOptions::default())).unwrap();
        for accepted in ["arm", "arm_l", "arm_l_jnt"] {
            assert!(re.is_match(accepted), "{accepted}");
        }
        for rejected in ["arm__jnt", "_l_jnt"] {
            assert!(!re.is_match(rejected), "{rejected}");
        }
    }

    #[test]
    fn test_parse_and_fallback() {
        let manager = rig_manager();
        match manager.parse("armUpper_l_ctl") {
            Parsed::Tokens(data) => {
                assert_eq!(data["descriptor"], "armUpper");
                assert_eq!(data["side"], "l");
                assert_eq!(data["usage"], "ctl");
            }
            Parsed::Unparsed(name) => panic!("expected tokens for {name}"),
        }
        assert_eq!(
            manager.parse("Not_A_Name_At_All"),
            Parsed::Unparsed("Not_A_Name_At_All".into())
        );
    }

    #[test]
    fn test_multi_char_separator_round_trip() {
        let manager = Manager::new(
            vec!["a".into(), "b".into()],
            "__",
            IndexMap::new(),
            IndexMap::new(),
            GlobalRules::default(),
        )
        .unwrap();

        let name = manager.build([("a", "arm"), ("b", "_l")]).unwrap();
        assert_eq!(name, "arm___l");
        let data = manager.get_data(&name);
        assert_eq!(data["a"], "arm");
        assert_eq!(data["b"], "_l");
        assert!(manager.is_valid(&name));
    }

    #[test]
    fn test_predicate_on_first_token_absorbs_the_name() {
        let mut parts = rig_manager().to_parts();
        parts.rules.insert(
            "descriptor".into(),
            Arc::new(PredicateRule::new(
                Arc::new(|v: &str| !v.is_empty()),
                "tests.non_empty",
            )),
        );
        let manager = Manager::from_parts(parts).unwrap();

        let name = manager
            .build([("descriptor", "arm"), ("side", "l"), ("usage", "jnt")])
            .unwrap();
        assert_eq!(name, "arm_l_jnt");

        // Predicates render as a greedy permissive fragment, so extraction hands
        // the whole name to the first token and the per-token recheck fails.
        let data = manager.get_data(&name);
        assert_eq!(data["descriptor"], "arm_l_jnt");
        assert_eq!(data["side"], "");
        assert!(!manager.is_valid(&name));
    }

    #[test]
    fn test_diagnostics() {
        let manager = rig_manager();
        assert!(manager.get_errors("arm_l_jnt").is_empty());
        let errors = manager.get_errors("Arm_q");
        assert_eq!(
            errors,
            [
                "Invalid value 'Arm' for token 'descriptor'.",
                "Invalid value 'q' for token 'side'."
            ]
        );
    }
}

#[cfg(test)]
mod update_and_resolve_tests {
    use super::*;

    #[test]
    fn test_update_replaces_one_token() {
        let manager = rig_manager();
        assert_eq!(manager.update("arm_l_jnt", [("side", "r")]).unwrap(), "arm_r_jnt");
    }

    #[test]
    fn test_update_seeds_first_token_from_bare_value() {
        let mut parts = rig_manager().to_parts();
        parts.rules.insert(
            "descriptor".into(),
            Arc::new(PredicateRule::new(
                Arc::new(|v: &str| !v.is_empty() && !v.contains('!')),
                "tests.no_bang",
            )),
        );
        let manager = Manager::from_parts(parts).unwrap();

        // Whitespace defeats the extraction regex, so the whole name seeds the descriptor.
        assert_eq!(manager.update("arm upper", [("usage", "jnt")]).unwrap(), "armUpper_jnt");
        let err = manager.update("bad name!", [("usage", "jnt")]).unwrap_err();
        assert!(format!("{err}").contains("first token 'descriptor'"));
    }

    #[test]
    fn test_resolve_sequence_matches_build() {
        let manager = rig_manager();
        let built = manager
            .build([("descriptor", "arm"), ("side", "l"), ("usage", "jnt")])
            .unwrap();
        assert_eq!(manager.resolve(vec!["arm", "l", "jnt"]).unwrap(), built);

        let err = manager.resolve(vec!["arm", "l", "jnt", "extra"]).unwrap_err();
        assert!(format!("{err}").contains("4 items but only 3 tokens"));
    }

    #[test]
    fn test_resolve_with_token_override() {
        let manager = rig_manager();
        let overrides = Overrides::default().tokens(["descriptor", "side"]);
        assert_eq!(manager.resolve_with(vec!["arm", "left"], &overrides).unwrap(), "arm_l");
        assert!(manager.resolve_with(vec!["arm", "l", "jnt"], &overrides).is_err());
    }
}

#[cfg(test)]
mod shared_manager_tests {
    use super::*;

    #[test]
    fn test_concurrent_reads_during_rule_updates() {
        let manager = Arc::new(rig_manager());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for _ in 0..200 {
                        assert_eq!(manager.get_data("arm_l_jnt")["side"], "l");
                        let pattern = manager.get_matching_regex(RegexOptions::default());
                        assert!(regex::Regex::new(&pattern).is_ok());
                    }
                })
            })
            .collect();

        for i in 0..50 {
            let usage: Rule = Arc::new(FixedSetRule::new(["jnt", "ctl"]));
            if i % 2 == 0 {
                manager.add_rule("usage", usage).unwrap();
            } else {
                manager.remove_rule("usage").unwrap();
            }
        }

        for reader in readers {
            reader.join().unwrap();
        }

        // Writes are visible as soon as the mutator returns.
        manager
            .add_rule("usage", Arc::new(FixedSetRule::new(["geo"])))
            .unwrap();
        assert!(!manager.is_valid("arm_l_jnt"));
        assert!(manager.is_valid("arm_l_geo"));
    }

    #[test]
    fn test_default_convention_end_to_end() {
        let manager = NamingConfig::default()
            .build_manager(&Registries::with_builtins())
            .unwrap();
        let name = manager
            .build([("descriptor", "upper arm"), ("side", "right"), ("usage", "ctl")])
            .unwrap();
        assert_eq!(name, "upperArm_r_ctl");
        assert!(manager.is_valid(&name));
        assert_eq!(manager.update(&name, [("usage", "jnt")]).unwrap(), "upperArm_r_jnt");
    }
}
