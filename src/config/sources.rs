//! Config sources: global file and workspace files, each parsed into its own record.

use super::{ConfigSnippet, ProvisionConfig};
use crate::error::ConfigError;
use std::path::Path;
use tracing::debug;

pub(crate) mod global_file;
pub(crate) mod workspace_file;

/// Read and parse one snippet file into an unfinalized record.
pub(crate) fn read_snippet(path: &Path) -> Result<ProvisionConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let config = ConfigSnippet::parse(&content, path)?.into_config()?;
    debug!(
        config_path = %path.display(),
        zones = config.zone_names().len(),
        "Loaded config snippet"
    );
    Ok(config)
}
