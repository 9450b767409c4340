//! Attribute settings and the default table applied by `finalize`.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// State of a single scalar attribute.
///
/// `Unset` is the never-assigned marker. It is distinct from `Absent` (explicitly
/// "none") and from every value, the empty string included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Setting {
    #[default]
    Unset,
    Absent,
    Value(String),
}

impl Setting {
    pub fn is_unset(&self) -> bool {
        matches!(self, Setting::Unset)
    }

    /// The assigned value, if any.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Setting::Value(v) => Some(v.as_str()),
            Setting::Unset | Setting::Absent => None,
        }
    }

    /// Replace `self` with `layer` unless `layer` was never assigned.
    pub(crate) fn overlay(&mut self, layer: &Setting) {
        if !layer.is_unset() {
            *self = layer.clone();
        }
    }
}

impl From<&str> for Setting {
    fn from(value: &str) -> Self {
        Setting::Value(value.to_string())
    }
}

impl From<String> for Setting {
    fn from(value: String) -> Self {
        Setting::Value(value)
    }
}

impl<T: Into<String>> From<Option<T>> for Setting {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Setting::Value(v.into()),
            None => Setting::Absent,
        }
    }
}

/// Scalar attributes of a provisioning record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Name,
    Image,
    Zone,
    Network,
    MachineType,
    ExternalIp,
    GoogleClientEmail,
    GoogleKeyLocation,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::Name,
        Attribute::Image,
        Attribute::Zone,
        Attribute::Network,
        Attribute::MachineType,
        Attribute::ExternalIp,
        Attribute::GoogleClientEmail,
        Attribute::GoogleKeyLocation,
    ];

    /// Canonical snake_case key, as used in config snippets.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Image => "image",
            Attribute::Zone => "zone",
            Attribute::Network => "network",
            Attribute::MachineType => "machine_type",
            Attribute::ExternalIp => "external_ip",
            Attribute::GoogleClientEmail => "google_client_email",
            Attribute::GoogleKeyLocation => "google_key_location",
        }
    }

    /// Default applied to this attribute when it is still unset at finalize time.
    pub fn default_value(self) -> &'static AttributeDefault {
        DEFAULTS
            .iter()
            .find(|(attr, _)| *attr == self)
            .map(|(_, default)| default)
            .unwrap_or(&AttributeDefault::Absent)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Attribute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let attr = match s {
            "name" => Attribute::Name,
            "image" => Attribute::Image,
            "zone" => Attribute::Zone,
            "network" => Attribute::Network,
            "machine_type" | "machineType" => Attribute::MachineType,
            "external_ip" | "externalIP" => Attribute::ExternalIp,
            "google_client_email" | "googleClientEmail" => Attribute::GoogleClientEmail,
            "google_key_location" | "googleKeyLocation" => Attribute::GoogleKeyLocation,
            other => return Err(ConfigError::UnknownAttribute(other.to_string())),
        };
        Ok(attr)
    }
}

/// Where a default comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeDefault {
    Literal(&'static str),
    Absent,
    /// Read from the named environment variable; `Absent` when the variable is missing.
    Env(&'static str),
}

impl AttributeDefault {
    pub fn resolve(&self, env: &mut dyn FnMut(&str) -> Option<String>) -> Setting {
        match self {
            AttributeDefault::Literal(v) => Setting::from(*v),
            AttributeDefault::Absent => Setting::Absent,
            AttributeDefault::Env(var) => Setting::from(env(var)),
        }
    }
}

pub const GOOGLE_CLIENT_EMAIL_ENV: &str = "GOOGLE_CLIENT_EMAIL";
pub const GOOGLE_KEY_LOCATION_ENV: &str = "GOOGLE_KEY_LOCATION";

/// Defaults in application order.
pub static DEFAULTS: [(Attribute, AttributeDefault); 8] = [
    (Attribute::Name, AttributeDefault::Literal("new")),
    (
        Attribute::Image,
        AttributeDefault::Literal("debian-7-wheezy-v20130816"),
    ),
    (Attribute::Zone, AttributeDefault::Literal("us-central1-a")),
    (Attribute::Network, AttributeDefault::Literal("default")),
    (
        Attribute::MachineType,
        AttributeDefault::Literal("n1-standard-1"),
    ),
    (Attribute::ExternalIp, AttributeDefault::Absent),
    (
        Attribute::GoogleClientEmail,
        AttributeDefault::Env(GOOGLE_CLIENT_EMAIL_ENV),
    ),
    (
        Attribute::GoogleKeyLocation,
        AttributeDefault::Env(GOOGLE_KEY_LOCATION_ENV),
    ),
];

/// Fill `slot` from `default` if it was never assigned. Returns true when it changed.
pub(crate) fn apply_default(
    slot: &mut Setting,
    default: &AttributeDefault,
    env: &mut dyn FnMut(&str) -> Option<String>,
) -> bool {
    if !slot.is_unset() {
        return false;
    }
    *slot = default.resolve(env);
    true
}
