//! Command implementations.

mod info;
mod sync;
mod validate;

pub use info::run_info;
pub use sync::run_sync;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::SessionConfig;
use std::path::Path;

/// Load the session configuration, or defaults when no path is given
fn load_session(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => config_loader::ConfigLoader::load_from_path(path)
            .with_context(|| format!("Failed to load session config from {}", path.display())),
        None => Ok(SessionConfig::default()),
    }
}
