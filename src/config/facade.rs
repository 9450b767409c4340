//! Config loading facade: combines every source into one record.

use super::sources::{global_file, read_snippet, workspace_file};
use super::ProvisionConfig;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads provisioning configuration from the global and workspace sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and merge all sources for `workspace_root`.
    ///
    /// Precedence (lowest to highest): global file, workspace config/config.toml,
    /// workspace config/{GCE_CONFIG_ENV}.toml. The result is not finalized.
    pub fn load(workspace_root: &Path) -> Result<ProvisionConfig, ConfigError> {
        let mut layers = Vec::new();
        if let Some(global) = global_file::load()? {
            layers.push(global);
        }
        layers.extend(workspace_file::load(workspace_root)?);

        debug!(
            workspace = %workspace_root.display(),
            layers = layers.len(),
            "Merging config sources"
        );
        Ok(Self::merge_layers(layers))
    }

    /// Load a single snippet file.
    pub fn load_from_file(path: &Path) -> Result<ProvisionConfig, ConfigError> {
        read_snippet(path)
    }

    /// Merge records in order, later ones taking precedence.
    pub fn merge_layers<I>(layers: I) -> ProvisionConfig
    where
        I: IntoIterator<Item = ProvisionConfig>,
    {
        layers
            .into_iter()
            .fold(ProvisionConfig::new(), |acc, layer| acc.merge(&layer))
    }

    /// User-level config file: `$XDG_CONFIG_HOME/gce-config/config.toml`, else under `~/.config`.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
