//! Configuration System
//!
//! Layered provisioning configuration for Compute Engine instances. A record holds
//! explicitly assigned attributes, falls back to defaults on `finalize`, and can be
//! resolved per zone or merged with records loaded from other sources.

use crate::error::ConfigError;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

mod facade;
mod merge;
mod setting;
mod snippet;
mod sources;
mod zone;

pub use facade::ConfigLoader;
pub use setting::{
    Attribute, AttributeDefault, Setting, DEFAULTS, GOOGLE_CLIENT_EMAIL_ENV,
    GOOGLE_KEY_LOCATION_ENV,
};
pub use snippet::{AttributeSnippet, ConfigSnippet, ExternalIpSnippet};
pub use zone::{validate_zone_name, OverrideBlock, OverrideSpec};

use setting::apply_default;
use zone::ZoneOverrides;

/// Provisioning configuration record.
///
/// Scalar attributes start out `Unset` and are assigned directly. Reads through
/// [`ProvisionConfig::get`] and zone resolution require [`ProvisionConfig::finalize`].
#[derive(Debug, Clone, Default)]
pub struct ProvisionConfig {
    /// Instance name
    pub name: Setting,
    /// Boot image
    pub image: Setting,
    pub zone: Setting,
    pub network: Setting,
    pub machine_type: Setting,
    /// External IP address; `Absent` means no explicit address
    pub external_ip: Setting,
    /// Service account email (defaults to `GOOGLE_CLIENT_EMAIL`)
    pub google_client_email: Setting,
    /// Service account key path (defaults to `GOOGLE_KEY_LOCATION`)
    pub google_key_location: Setting,

    /// Instance metadata, mutated in place
    pub metadata: BTreeMap<String, String>,

    zone_overrides: ZoneOverrides,
    compiled_zones: BTreeMap<String, ProvisionConfig>,
    finalized: bool,
    zone_specific: bool,
}

/// Plain-value view of a finalized record, as consumed by the provisioning workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSpec {
    pub name: Option<String>,
    pub image: Option<String>,
    pub zone: Option<String>,
    pub network: Option<String>,
    pub machine_type: Option<String>,
    pub external_ip: Option<String>,
    pub google_client_email: Option<String>,
    pub google_key_location: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NotFinalized,
    Missing(Attribute),
    Empty(Attribute),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NotFinalized => write!(f, "Configuration is not finalized"),
            ValidationError::Missing(attr) => write!(f, "Attribute '{}' is required", attr),
            ValidationError::Empty(attr) => write!(f, "Attribute '{}' cannot be empty", attr),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ProvisionConfig {
    /// Create a record with every attribute unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Partial record holding one zone's overrides. Finalizing it applies no defaults.
    pub(crate) fn zone_specific() -> Self {
        Self {
            zone_specific: true,
            ..Self::default()
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn setting(&self, attr: Attribute) -> &Setting {
        match attr {
            Attribute::Name => &self.name,
            Attribute::Image => &self.image,
            Attribute::Zone => &self.zone,
            Attribute::Network => &self.network,
            Attribute::MachineType => &self.machine_type,
            Attribute::ExternalIp => &self.external_ip,
            Attribute::GoogleClientEmail => &self.google_client_email,
            Attribute::GoogleKeyLocation => &self.google_key_location,
        }
    }

    pub fn setting_mut(&mut self, attr: Attribute) -> &mut Setting {
        match attr {
            Attribute::Name => &mut self.name,
            Attribute::Image => &mut self.image,
            Attribute::Zone => &mut self.zone,
            Attribute::Network => &mut self.network,
            Attribute::MachineType => &mut self.machine_type,
            Attribute::ExternalIp => &mut self.external_ip,
            Attribute::GoogleClientEmail => &mut self.google_client_email,
            Attribute::GoogleKeyLocation => &mut self.google_key_location,
        }
    }

    pub fn set(&mut self, attr: Attribute, value: impl Into<Setting>) {
        *self.setting_mut(attr) = value.into();
    }

    /// Apply defaults using the process environment for credential attributes.
    pub fn finalize(&mut self) {
        self.finalize_with_env(|var| std::env::var(var).ok());
    }

    /// Apply defaults to every unset attribute, then compile the registered zone overrides.
    ///
    /// `env` is consulted only for env-derived defaults whose attribute is still unset.
    /// Calling this again changes nothing: assigned attributes are never overwritten.
    pub fn finalize_with_env<F>(&mut self, mut env: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        if !self.zone_specific {
            for (attr, default) in DEFAULTS.iter() {
                if apply_default(self.setting_mut(*attr), default, &mut env) {
                    debug!(attribute = %attr, value = ?self.setting(*attr), "Applied default");
                }
            }
        }

        self.compiled_zones = self.zone_overrides.compile_all();
        trace!(zones = self.compiled_zones.len(), "Compiled zone overrides");

        self.finalized = true;
    }

    /// Read an attribute's value; `None` when it resolved to absent.
    pub fn get(&self, attr: Attribute) -> Result<Option<&str>, ConfigError> {
        if !self.finalized {
            return Err(ConfigError::NotFinalized);
        }
        Ok(self.setting(attr).as_value())
    }

    /// Snapshot the finalized values for the provisioning workflow.
    pub fn instance_spec(&self) -> Result<InstanceSpec, ConfigError> {
        let value = |attr| self.get(attr).map(|v| v.map(str::to_string));
        Ok(InstanceSpec {
            name: value(Attribute::Name)?,
            image: value(Attribute::Image)?,
            zone: value(Attribute::Zone)?,
            network: value(Attribute::Network)?,
            machine_type: value(Attribute::MachineType)?,
            external_ip: value(Attribute::ExternalIp)?,
            google_client_email: value(Attribute::GoogleClientEmail)?,
            google_key_location: value(Attribute::GoogleKeyLocation)?,
            metadata: self.metadata.clone(),
        })
    }

    /// Check that everything the provisioning workflow needs is present.
    ///
    /// `external_ip` is optional; every other attribute must hold a non-empty value.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        if !self.finalized {
            return Err(vec![ValidationError::NotFinalized]);
        }

        let errors: Vec<ValidationError> = Attribute::ALL
            .iter()
            .filter(|attr| **attr != Attribute::ExternalIp)
            .filter_map(|attr| match self.setting(*attr) {
                Setting::Value(v) if v.is_empty() => Some(ValidationError::Empty(*attr)),
                Setting::Value(_) => None,
                Setting::Unset | Setting::Absent => Some(ValidationError::Missing(*attr)),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy of the scalar attributes and metadata, without zone overrides or state.
    fn values_only(&self) -> ProvisionConfig {
        ProvisionConfig {
            name: self.name.clone(),
            image: self.image.clone(),
            zone: self.zone.clone(),
            network: self.network.clone(),
            machine_type: self.machine_type.clone(),
            external_ip: self.external_ip.clone(),
            google_client_email: self.google_client_email.clone(),
            google_key_location: self.google_key_location.clone(),
            metadata: self.metadata.clone(),
            ..ProvisionConfig::default()
        }
    }
}
