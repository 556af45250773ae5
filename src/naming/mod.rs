//! Naming-convention engine.
//!
//! A convention is an ordered list of tokens joined by a separator
//! (`armUpper_l_jnt` for `[descriptor, side, usage]`). Each token may carry a
//! [`TokenRule`] and a [`Normalizer`]; the [`Manager`] uses them to build,
//! parse, validate and update names.
//!
//! ```
//! use rig_naming::core::config::NamingConfig;
//! use rig_naming::naming::Registries;
//!
//! let manager = NamingConfig::default()
//!     .build_manager(&Registries::with_builtins())
//!     .unwrap();
//! let name = manager
//!     .build([("descriptor", "Arm Upper"), ("side", "left"), ("usage", "jnt")])
//!     .unwrap();
//! assert_eq!(name, "armUpper_l_jnt");
//! assert_eq!(manager.update(&name, [("side", "right")]).unwrap(), "armUpper_r_jnt");
//! ```

pub mod compiler;
pub mod convention;
pub mod global;
pub mod manager;
pub mod normalizers;
pub mod pattern;
pub mod predicates;
pub mod rules;
pub mod text;
pub mod types;
pub mod vocabulary;

pub use compiler::{
    compile_rules, CompiledRules, GlobalRulesConfig, Registries, RuleDescriptor, RuleEntry,
    RuleKind, RuleValue, GLOBAL_RULES_KEY,
};
pub use convention::validate_convention;
pub use global::{global, init_global};
pub use manager::{Manager, ManagerParts};
pub use normalizers::{resolve_normalizers, Normalizer, NormalizerRegistry};
pub use pattern::RegexOptions;
pub use predicates::{Predicate, PredicateRegistry};
pub use rules::{FixedSetRule, GlobalRules, PatternRule, PredicateRule, Rule, TokenRule};
pub use types::{NameInput, Overrides, Parsed, TokenData, TokenValue};
pub use vocabulary::{Label, Vocabulary, VocabularyRegistry};
