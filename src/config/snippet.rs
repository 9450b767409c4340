//! Config snippets: single TOML files holding a subset of the configuration.
//!
//! ```toml
//! image = "debian-7-wheezy-v20130816"
//! machine_type = "n1-standard-2"
//! external_ip = false
//!
//! [metadata]
//! startup-script = "apt-get update"
//!
//! [zones.europe-west1-b]
//! machine_type = "n1-highmem-2"
//! ```

use super::{Attribute, ProvisionConfig, Setting};
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level snippet: global attributes plus per-zone tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSnippet {
    #[serde(flatten)]
    pub attributes: AttributeSnippet,

    /// Zone override tables, keyed by zone name
    #[serde(default)]
    pub zones: BTreeMap<String, AttributeSnippet>,
}

/// Attributes present in a snippet. Missing keys stay unset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeSnippet {
    pub name: Option<String>,
    pub image: Option<String>,
    pub zone: Option<String>,
    pub network: Option<String>,
    pub machine_type: Option<String>,
    pub external_ip: Option<ExternalIpSnippet>,
    pub google_client_email: Option<String>,
    pub google_key_location: Option<String>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// `external_ip` accepts an address, or `false` for "no external address".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExternalIpSnippet {
    Address(String),
    Enabled(bool),
}

impl ExternalIpSnippet {
    fn to_setting(&self) -> Setting {
        match self {
            ExternalIpSnippet::Address(addr) => Setting::from(addr.as_str()),
            ExternalIpSnippet::Enabled(false) => Setting::Absent,
            // `true` asks for the default behaviour.
            ExternalIpSnippet::Enabled(true) => Setting::Unset,
        }
    }
}

impl AttributeSnippet {
    /// Assignments for the keys present in this snippet.
    pub fn settings(&self) -> Vec<(Attribute, Setting)> {
        let strings = [
            (Attribute::Name, &self.name),
            (Attribute::Image, &self.image),
            (Attribute::Zone, &self.zone),
            (Attribute::Network, &self.network),
            (Attribute::MachineType, &self.machine_type),
            (Attribute::GoogleClientEmail, &self.google_client_email),
            (Attribute::GoogleKeyLocation, &self.google_key_location),
        ];

        let mut settings: Vec<(Attribute, Setting)> = strings
            .into_iter()
            .filter_map(|(attr, value)| value.as_deref().map(|v| (attr, Setting::from(v))))
            .collect();
        if let Some(external_ip) = &self.external_ip {
            let setting = external_ip.to_setting();
            if !setting.is_unset() {
                settings.push((Attribute::ExternalIp, setting));
            }
        }
        settings
    }

    pub fn apply_to(&self, config: &mut ProvisionConfig) {
        for (attr, setting) in self.settings() {
            config.set(attr, setting);
        }
        for (key, value) in &self.metadata {
            config.metadata.insert(key.clone(), value.clone());
        }
    }
}

impl ConfigSnippet {
    /// Parse snippet content; `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build an unfinalized record, registering each zone table as an override.
    pub fn into_config(self) -> Result<ProvisionConfig, ConfigError> {
        let mut config = ProvisionConfig::new();
        self.attributes.apply_to(&mut config);

        for (zone, attributes) in self.zones {
            config.zone_config(&zone, move |partial| attributes.apply_to(partial))?;
        }
        Ok(config)
    }
}
