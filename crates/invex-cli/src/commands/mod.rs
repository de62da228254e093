//! Subcommands of the `invex` binary.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;

use invex_core::InvexConfig;
use tracing::debug;

/// Load the configuration named by `--config`, else the user's config file,
/// else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvexConfig> {
    if let Some(path) = config_path {
        return Ok(InvexConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(InvexConfig::from_file(&default_path)?)
    } else {
        Ok(InvexConfig::default())
    }
}
