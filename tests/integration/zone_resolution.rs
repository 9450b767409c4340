//! End-to-end scenarios: populate, register overrides, finalize, resolve, merge.

use gce_config::config::{Attribute, OverrideSpec, ProvisionConfig, Setting};
use gce_config::error::ConfigError;

fn finalize(config: &mut ProvisionConfig) {
    config.finalize_with_env(|var| match var {
        "GOOGLE_CLIENT_EMAIL" => Some("client_id_email".to_string()),
        "GOOGLE_KEY_LOCATION" => Some("/path/to/key".to_string()),
        _ => None,
    });
}

#[test]
fn test_all_foo_global_config_resolves_with_zone_forced() {
    let mut config = ProvisionConfig::new();
    config.name = "foo".into();
    config.zone = "foo".into();
    config.image = "foo".into();
    config.machine_type = "foo".into();
    config.network = "foo".into();
    config.external_ip = "foo".into();
    finalize(&mut config);

    let resolved = config.resolve_zone("us-central1-a").unwrap();
    let spec = resolved.instance_spec().unwrap();
    assert_eq!(spec.name.as_deref(), Some("foo"));
    assert_eq!(spec.image.as_deref(), Some("foo"));
    assert_eq!(spec.machine_type.as_deref(), Some("foo"));
    assert_eq!(spec.network.as_deref(), Some("foo"));
    assert_eq!(spec.external_ip.as_deref(), Some("foo"));
    assert_eq!(spec.zone.as_deref(), Some("us-central1-a"));
    assert_eq!(spec.google_client_email.as_deref(), Some("client_id_email"));
    assert_eq!(spec.google_key_location.as_deref(), Some("/path/to/key"));
}

#[test]
fn test_child_zone_overrides_parent_image() {
    let mut config = ProvisionConfig::new();
    config.image = "parent".into();
    config
        .register_zone_override(
            "hashi-zone",
            OverrideSpec::callback(|zone| zone.image = "child".into()),
        )
        .unwrap();
    finalize(&mut config);

    let resolved = config.resolve_zone("hashi-zone").unwrap();
    assert_eq!(resolved.get(Attribute::Image).unwrap(), Some("child"));
    for attr in [
        Attribute::Name,
        Attribute::Network,
        Attribute::MachineType,
        Attribute::ExternalIp,
        Attribute::GoogleClientEmail,
        Attribute::GoogleKeyLocation,
    ] {
        assert_eq!(resolved.get(attr).unwrap(), config.get(attr).unwrap());
    }
    assert_eq!(config.get(Attribute::Image).unwrap(), Some("parent"));
}

#[test]
fn test_shortcut_mapping_and_callback_agree_for_every_attribute() {
    for attr in Attribute::ALL {
        let mut by_callback = ProvisionConfig::new();
        by_callback
            .register_zone_override(
                "us-central1-a",
                OverrideSpec::callback(move |zone| zone.set(attr, "child")),
            )
            .unwrap();
        let mut by_mapping = ProvisionConfig::new();
        by_mapping
            .register_zone_override("us-central1-a", OverrideSpec::assign([(attr, "child")]))
            .unwrap();

        finalize(&mut by_callback);
        finalize(&mut by_mapping);
        assert_eq!(
            by_callback
                .resolve_zone("us-central1-a")
                .unwrap()
                .instance_spec()
                .unwrap(),
            by_mapping
                .resolve_zone("us-central1-a")
                .unwrap()
                .instance_spec()
                .unwrap(),
            "{} differs between override forms",
            attr
        );
    }
}

#[test]
fn test_resolve_before_finalize_fails() {
    let config = ProvisionConfig::new();
    for zone in ["us-central1-a", "hashi-zone", ""] {
        assert!(matches!(
            config.resolve_zone(zone),
            Err(ConfigError::NotFinalized)
        ));
    }
}

#[test]
fn test_merged_plugin_configs_resolve_together() {
    let mut a = ProvisionConfig::new();
    a.metadata.insert("one".to_string(), "foo".to_string());
    a.image = "a-image".into();
    a.zone_settings("us-central1-a", [(Attribute::MachineType, "n1-standard-4")])
        .unwrap();

    let mut b = ProvisionConfig::new();
    b.metadata.insert("two".to_string(), "bar".to_string());
    b.google_client_email = Setting::Absent;
    b.zone_config("us-central1-a", |zone| {
        zone.metadata
            .insert("zone-role".to_string(), "primary".to_string());
    })
    .unwrap();

    let mut merged = a.merge(&b);
    assert_eq!(merged.metadata.get("one").unwrap(), "foo");
    assert_eq!(merged.metadata.get("two").unwrap(), "bar");
    finalize(&mut merged);

    let resolved = merged.resolve_zone("us-central1-a").unwrap();
    assert_eq!(resolved.get(Attribute::Image).unwrap(), Some("a-image"));
    assert_eq!(
        resolved.get(Attribute::MachineType).unwrap(),
        Some("n1-standard-4")
    );
    assert_eq!(resolved.get(Attribute::GoogleClientEmail).unwrap(), None);
    assert_eq!(resolved.metadata.len(), 3);
    assert_eq!(resolved.metadata.get("zone-role").unwrap(), "primary");
}

#[test]
fn test_invalid_zone_names_rejected() {
    let mut config = ProvisionConfig::new();
    for zone in ["", "two words", "-dash"] {
        let err = config
            .register_zone_override(zone, OverrideSpec::assign([(Attribute::Image, "x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidZoneName(_)));
    }
    assert!(config.zone_names().is_empty());
}
