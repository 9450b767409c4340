//! Property-based tests for layering guarantees

use gce_config::config::{Attribute, ProvisionConfig, Setting};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn setting_strategy() -> impl Strategy<Value = Setting> {
    prop_oneof![
        Just(Setting::Unset),
        Just(Setting::Absent),
        "[a-z0-9-]{0,8}".prop_map(Setting::Value),
    ]
}

fn config_strategy() -> impl Strategy<Value = ProvisionConfig> {
    (
        vec(setting_strategy(), Attribute::ALL.len()),
        btree_map("[a-z]{1,4}", "[a-z]{0,4}", 0..4),
    )
        .prop_map(|(settings, metadata)| {
            let mut config = ProvisionConfig::new();
            for (attr, setting) in Attribute::ALL.into_iter().zip(settings) {
                config.set(attr, setting);
            }
            config.metadata = metadata;
            config
        })
}

fn env(var: &str) -> Option<String> {
    match var {
        "GOOGLE_CLIENT_EMAIL" => Some("env-email".to_string()),
        _ => None,
    }
}

/// Finalize never overwrites an assigned attribute, and a second pass changes nothing
#[test]
fn test_finalize_is_idempotent_and_non_destructive() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&config_strategy(), |original| {
            let mut config = original.clone();
            config.finalize_with_env(env);

            for attr in Attribute::ALL {
                let before = original.setting(attr);
                let after = config.setting(attr);
                prop_assert!(!after.is_unset());
                if before.is_unset() {
                    prop_assert_eq!(after, &attr.default_value().resolve(&mut env));
                } else {
                    prop_assert_eq!(after, before);
                }
            }

            let once = config.instance_spec().unwrap();
            config.finalize_with_env(|_| Some("second-pass".to_string()));
            prop_assert_eq!(config.instance_spec().unwrap(), once);

            Ok(())
        })
        .unwrap();
}

/// Merge takes every assigned attribute from the overriding side
#[test]
fn test_merge_prefers_assigned_values_of_other() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(config_strategy(), config_strategy()), |(a, b)| {
            let merged = a.merge(&b);

            for attr in Attribute::ALL {
                let expected = if b.setting(attr).is_unset() {
                    a.setting(attr)
                } else {
                    b.setting(attr)
                };
                prop_assert_eq!(merged.setting(attr), expected);
            }

            let mut expected_metadata: BTreeMap<String, String> = a.metadata.clone();
            expected_metadata.extend(b.metadata.clone());
            prop_assert_eq!(&merged.metadata, &expected_metadata);
            prop_assert!(!merged.is_finalized());

            Ok(())
        })
        .unwrap();
}

/// Zone resolution layers override blocks over globals in registration order, and
/// always pins the zone. Unset assignments in a later block keep earlier values.
#[test]
fn test_resolution_layers_overrides() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                config_strategy(),
                config_strategy(),
                config_strategy(),
                "[a-z][a-z0-9-]{0,10}",
            ),
            |(global, first, second, zone)| {
                let assignments = |layer: &ProvisionConfig| -> Vec<(Attribute, Setting)> {
                    Attribute::ALL
                        .into_iter()
                        .map(|attr| (attr, layer.setting(attr).clone()))
                        .collect()
                };

                let mut config = global.clone();
                config.zone_settings(&zone, assignments(&first)).unwrap();
                config.zone_settings(&zone, assignments(&second)).unwrap();
                config.finalize_with_env(env);

                let resolved = config.resolve_zone(&zone).unwrap();
                for attr in Attribute::ALL {
                    if attr == Attribute::Zone {
                        prop_assert_eq!(resolved.get(attr).unwrap(), Some(zone.as_str()));
                        continue;
                    }
                    let expected = if !second.setting(attr).is_unset() {
                        second.setting(attr)
                    } else if !first.setting(attr).is_unset() {
                        first.setting(attr)
                    } else {
                        config.setting(attr)
                    };
                    prop_assert_eq!(resolved.setting(attr), expected);
                }

                let untouched = config.resolve_zone("zz-no-overrides").unwrap();
                for attr in Attribute::ALL {
                    if attr != Attribute::Zone {
                        prop_assert_eq!(untouched.setting(attr), config.setting(attr));
                    }
                }

                Ok(())
            },
        )
        .unwrap();
}
