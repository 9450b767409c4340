//! Zone override registry and per-zone resolution.

use super::{Attribute, ProvisionConfig, Setting};
use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type OverrideFn = dyn Fn(&mut ProvisionConfig) + Send + Sync;

/// Deferred partial update registered against one zone.
///
/// Applied to a fresh zone-specific record; whatever it leaves `Unset` is inherited
/// from the global record at resolution time.
#[derive(Clone)]
pub struct OverrideBlock(Arc<OverrideFn>);

impl OverrideBlock {
    pub fn apply(&self, partial: &mut ProvisionConfig) {
        (self.0)(partial)
    }
}

impl fmt::Debug for OverrideBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OverrideBlock(..)")
    }
}

/// The two ways a caller can describe a zone override.
pub enum OverrideSpec {
    /// Closure mutating the fields it cares about.
    Callback(Arc<OverrideFn>),
    /// Literal attribute assignments, applied in order.
    Assign(Vec<(Attribute, Setting)>),
}

impl OverrideSpec {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&mut ProvisionConfig) + Send + Sync + 'static,
    {
        OverrideSpec::Callback(Arc::new(f))
    }

    pub fn assign<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Attribute, V)>,
        V: Into<Setting>,
    {
        OverrideSpec::Assign(
            pairs
                .into_iter()
                .map(|(attr, value)| (attr, value.into()))
                .collect(),
        )
    }

    fn into_block(self) -> OverrideBlock {
        match self {
            OverrideSpec::Callback(f) => OverrideBlock(f),
            OverrideSpec::Assign(pairs) => {
                OverrideBlock(Arc::new(move |partial: &mut ProvisionConfig| {
                    for (attr, value) in &pairs {
                        partial.set(*attr, value.clone());
                    }
                }))
            }
        }
    }
}

impl fmt::Debug for OverrideSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideSpec::Callback(_) => f.write_str("Callback(..)"),
            OverrideSpec::Assign(pairs) => f.debug_tuple("Assign").field(pairs).finish(),
        }
    }
}

/// Zone names must be non-empty and made of ASCII alphanumerics, `-` and `_`,
/// starting with an alphanumeric.
pub fn validate_zone_name(zone: &str) -> Result<(), ConfigError> {
    let mut chars = zone.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphanumeric()
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidZoneName(zone.to_string()))
    }
}

/// Override blocks per zone, in registration order.
#[derive(Debug, Clone, Default)]
pub(crate) struct ZoneOverrides {
    blocks: BTreeMap<String, Vec<OverrideBlock>>,
}

impl ZoneOverrides {
    fn register(&mut self, zone: &str, block: OverrideBlock) -> Result<(), ConfigError> {
        validate_zone_name(zone)?;
        self.blocks.entry(zone.to_string()).or_default().push(block);
        Ok(())
    }

    fn zone_names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    fn block_count(&self, zone: &str) -> usize {
        self.blocks.get(zone).map_or(0, Vec::len)
    }

    /// Append `other`'s blocks after ours, zone by zone.
    pub(crate) fn extend(&mut self, other: &ZoneOverrides) {
        for (zone, blocks) in &other.blocks {
            self.blocks
                .entry(zone.clone())
                .or_default()
                .extend(blocks.iter().cloned());
        }
    }

    /// Run each of a zone's blocks on its own fresh zone-specific record, then layer
    /// those records in registration order and finalize the result.
    ///
    /// Fields a block leaves `Unset` never clear what an earlier block assigned.
    fn compile(&self, zone: &str) -> Option<ProvisionConfig> {
        let blocks = self.blocks.get(zone)?;
        let mut partial = ProvisionConfig::zone_specific();
        for block in blocks {
            let mut layer = ProvisionConfig::zone_specific();
            block.apply(&mut layer);
            partial.overlay(&layer);
        }
        partial.finalize_with_env(|_| None);
        Some(partial)
    }

    pub(crate) fn compile_all(&self) -> BTreeMap<String, ProvisionConfig> {
        self.blocks
            .keys()
            .filter_map(|zone| self.compile(zone).map(|partial| (zone.clone(), partial)))
            .collect()
    }
}

impl ProvisionConfig {
    /// Register an override for `zone`. Registrations for the same zone accumulate
    /// and are applied in registration order.
    pub fn register_zone_override(
        &mut self,
        zone: &str,
        spec: OverrideSpec,
    ) -> Result<(), ConfigError> {
        self.zone_overrides.register(zone, spec.into_block())?;
        debug!(
            zone,
            blocks = self.zone_overrides.block_count(zone),
            "Registered zone override"
        );

        // Keep the compiled cache in step with late registrations.
        if self.finalized {
            if let Some(partial) = self.zone_overrides.compile(zone) {
                self.compiled_zones.insert(zone.to_string(), partial);
            }
        }
        Ok(())
    }

    /// Register a closure override for `zone`.
    pub fn zone_config<F>(&mut self, zone: &str, f: F) -> Result<(), ConfigError>
    where
        F: Fn(&mut ProvisionConfig) + Send + Sync + 'static,
    {
        self.register_zone_override(zone, OverrideSpec::callback(f))
    }

    /// Register literal attribute assignments for `zone`.
    pub fn zone_settings<I, V>(&mut self, zone: &str, pairs: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (Attribute, V)>,
        V: Into<Setting>,
    {
        self.register_zone_override(zone, OverrideSpec::assign(pairs))
    }

    /// Like [`ProvisionConfig::zone_settings`], keyed by attribute name.
    ///
    /// Nothing is registered if any key is unknown.
    pub fn zone_settings_by_key<I, K, V>(
        &mut self,
        zone: &str,
        pairs: I,
    ) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Setting>,
    {
        let mut assignments: Vec<(Attribute, Setting)> = Vec::new();
        for (key, value) in pairs {
            assignments.push((key.as_ref().parse::<Attribute>()?, value.into()));
        }
        self.zone_settings(zone, assignments)
    }

    /// Zones with at least one registered override, sorted.
    pub fn zone_names(&self) -> Vec<String> {
        self.zone_overrides.zone_names().map(str::to_string).collect()
    }

    /// Effective configuration for `zone`: global values overlaid with the zone's
    /// overrides, with `zone` always set to the requested name.
    pub fn resolve_zone(&self, zone: &str) -> Result<ProvisionConfig, ConfigError> {
        if !self.finalized {
            return Err(ConfigError::NotFinalized);
        }

        let mut resolved = self.values_only();
        if let Some(partial) = self.compiled_zones.get(zone) {
            resolved.overlay(partial);
        }
        resolved.zone = Setting::from(zone);
        resolved.finalized = true;

        debug!(
            zone,
            overridden = self.compiled_zones.contains_key(zone),
            "Resolved zone configuration"
        );
        Ok(resolved)
    }
}
