//! Process-wide shared manager.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use super::compiler::Registries;
use super::manager::Manager;
use crate::core::config::NamingConfig;
use crate::core::errors::{NamingError, Result};

static GLOBAL_MANAGER: OnceCell<Arc<Manager>> = OnceCell::new();

/// Install the shared manager. Fails if one is already installed.
pub fn init_global(manager: Manager) -> Result<Arc<Manager>> {
    let manager = Arc::new(manager);
    GLOBAL_MANAGER
        .set(Arc::clone(&manager))
        .map_err(|_| NamingError::config("The global naming manager is already initialised."))?;
    info!(tokens = ?manager.tokens(), "Installed global naming manager");
    Ok(manager)
}

/// The shared manager, built from the default convention on first use when
/// none was installed.
pub fn global() -> Result<Arc<Manager>> {
    GLOBAL_MANAGER
        .get_or_try_init(|| {
            let manager = NamingConfig::default().build_manager(&Registries::with_builtins())?;
            info!(tokens = ?manager.tokens(), "Initialised global naming manager from the default convention");
            Ok::<_, NamingError>(Arc::new(manager))
        })
        .cloned()
}
