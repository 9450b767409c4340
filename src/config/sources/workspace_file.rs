//! Workspace config file source: config/config.toml and config/{env}.toml

use crate::config::ProvisionConfig;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Environment variable selecting the env-specific workspace file.
pub const ENV_VAR: &str = "GCE_CONFIG_ENV";

/// Candidate workspace files in precedence order (later wins):
/// config/config.toml (base) then config/{GCE_CONFIG_ENV}.toml (env-specific).
fn workspace_config_paths(workspace_root: &Path) -> Vec<PathBuf> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var(ENV_VAR).unwrap_or_else(|_| "development".to_string());

    vec![
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ]
}

/// Load the workspace files that exist, in precedence order.
pub(crate) fn load(workspace_root: &Path) -> Result<Vec<ProvisionConfig>, ConfigError> {
    workspace_config_paths(workspace_root)
        .into_iter()
        .filter(|path| path.exists())
        .map(|path| super::read_snippet(&path))
        .collect()
}
