//! Merge rules: override order, conflict handling.

use crate::config::{Attribute, ProvisionConfig};
use std::collections::BTreeMap;
use tracing::trace;

impl ProvisionConfig {
    /// Combine `self` with `other`, `other` taking precedence.
    ///
    /// Scalars assigned in `other` win; scalars it left unset keep `self`'s value.
    /// Metadata is unioned with `other` winning on key collisions. Zone overrides of
    /// both sides are kept, `self`'s blocks first. The result is not finalized.
    pub fn merge(&self, other: &ProvisionConfig) -> ProvisionConfig {
        let mut result = self.clone();
        result.overlay(other);
        result.zone_overrides.extend(&other.zone_overrides);
        result.compiled_zones.clear();
        result.finalized = false;

        trace!(
            zones = result.zone_names().len(),
            metadata_keys = result.metadata.len(),
            "Merged configuration"
        );
        result
    }

    /// Overlay `layer`'s assigned scalars and metadata onto `self`.
    pub(crate) fn overlay(&mut self, layer: &ProvisionConfig) {
        for attr in Attribute::ALL {
            self.setting_mut(attr).overlay(layer.setting(attr));
        }
        merge_metadata(&mut self.metadata, &layer.metadata);
    }
}

fn merge_metadata(base: &mut BTreeMap<String, String>, layer: &BTreeMap<String, String>) {
    for (key, value) in layer {
        base.insert(key.clone(), value.clone());
    }
}
