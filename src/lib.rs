//! # rig-naming: Configurable Naming-Convention Engine
//!
//! Builds, parses, validates and updates structured artifact names such as
//! `armUpper_l_jnt`. A convention is declared once (token order, separator,
//! per-token rules and normalizers, global constraints) and compiled into a
//! [`Manager`] that every caller shares.
//!
//! - **Rules**: regex, fixed-set, vocabulary-derived and predicate rules behind one trait
//! - **Regex synthesis**: one matching regex per convention, tokens optional right-to-left
//! - **Two-tier parsing**: regex extraction first, positional split as fallback
//! - **Round-trip updates**: parse, override a token, rebuild
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    NamingConfig (YAML/JSON)              │
//! ├──────────────────────────────────────────────────────────┤
//! │  Compiler        │  Convention      │  Registries        │
//! │ • regex / list   │ • tokens unique  │ • vocabularies     │
//! │ • from_enums     │ • identifiers    │ • predicates       │
//! │ • callable       │ • separator rule │ • normalizers      │
//! ├──────────────────────────────────────────────────────────┤
//! │  Manager: build · parse · is_valid · update · resolve    │
//! │           regex synthesis · snapshot regex cache         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rig_naming::{NamingConfig, Registries};
//!
//! fn main() -> rig_naming::Result<()> {
//!     let manager = NamingConfig::default().build_manager(&Registries::with_builtins())?;
//!
//!     let name = manager.build([("descriptor", "arm"), ("side", "l"), ("usage", "jnt")])?;
//!     assert_eq!(name, "arm_l_jnt");
//!     assert!(manager.is_valid(&name));
//!     assert_eq!(manager.get_token_value(&name, "side")?, "l");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling and configuration
pub mod core {
    //! Errors and convention configuration.

    pub mod config;
    pub mod errors;
}

// Naming engine
pub mod naming;

// Re-export primary types for convenience
pub use crate::core::config::NamingConfig;
pub use crate::core::errors::{NamingError, Result};
pub use naming::{Manager, Parsed, Registries, RegexOptions, TokenData, TokenValue};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
