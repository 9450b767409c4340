//! Global config file source: $XDG_CONFIG_HOME/gce-config/config.toml or ~/.config/gce-config/config.toml

use crate::config::ProvisionConfig;
use crate::error::ConfigError;
use std::path::PathBuf;
use tracing::warn;

/// Path to global config file.
/// Uses XDG_CONFIG_HOME when set, otherwise ~/.config/gce-config/config.toml.
pub(crate) fn global_config_path() -> Option<PathBuf> {
    let config_home = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var("HOME").ok()?).join(".config"),
    };
    Some(config_home.join("gce-config").join("config.toml"))
}

/// Load the global config file if it exists.
pub(crate) fn load() -> Result<Option<ProvisionConfig>, ConfigError> {
    let Some(path) = global_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        warn!(
            config_path = %path.display(),
            "Global configuration file not found. \
             Consider creating it for user-level defaults."
        );
        return Ok(None);
    }
    super::read_snippet(&path).map(Some)
}
