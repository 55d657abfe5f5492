//! Configuration loading tests
//!
//! Configuration files are written to a temporary directory and loaded
//! through the public loader, then used to build a working table.

use std::fs;
use std::net::{IpAddr, Ipv4Addr};

use conntrack_other::config::{create_default_config, load_config, load_config_str};
use conntrack_other::connection::{ConnTable, FlowKey, OtherState};
use conntrack_other::{ConfigError, TimeoutClass, TimeoutPolicyTable};
use std::time::Duration;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"{
    "timeouts": { "other-first": 20, "other-multiple": 40, "other-bidir": 90 },
    "zones": [
        { "zone": 7, "timeouts": { "other-bidir": 5 } },
        { "zone": 8 }
    ],
    "table": { "max_connections": 64 },
    "offload": { "enabled": true, "channel_capacity": 16 },
    "log": { "level": "debug", "format": "json", "target": false }
}"#;

fn key(zone: u16) -> FlowKey {
    FlowKey::new(
        IpAddr::V4(Ipv4Addr::new(203, 0, 113, 10)),
        IpAddr::V4(Ipv4Addr::new(203, 0, 113, 20)),
        47,
        zone,
    )
}

#[test]
fn test_load_full_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conntrack.json");
    fs::write(&path, FULL_CONFIG).unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.table.max_connections, 64);
    assert!(config.offload.enabled);
    assert_eq!(config.log.format, "json");
    assert!(!config.log.target);

    let policies = TimeoutPolicyTable::from_config(&config);
    assert_eq!(policies.zone_count(), 2);
    assert_eq!(policies.lookup(0, TimeoutClass::OtherFirst), Duration::from_secs(20));
    assert_eq!(policies.lookup(7, TimeoutClass::OtherBidir), Duration::from_secs(5));
    // Unlisted classes fall back to the global policy, not built-in defaults
    assert_eq!(policies.lookup(7, TimeoutClass::OtherMultiple), Duration::from_secs(40));
    assert_eq!(policies.lookup(8, TimeoutClass::OtherBidir), Duration::from_secs(90));
}

#[test]
fn test_loaded_config_drives_table() {
    let config = load_config_str(FULL_CONFIG).unwrap();
    let (table, rx) = ConnTable::from_config(&config).unwrap();
    assert!(rx.is_some());

    table.process(key(7), false, None, 0).unwrap();
    assert_eq!(table.get(&key(7)).unwrap().expiration_ms, 20_000);

    table.process(key(7), true, None, 1_000).unwrap();
    let conn = table.get(&key(7)).unwrap();
    assert_eq!(conn.as_other().map(|o| o.state), Some(OtherState::Bidir));
    assert_eq!(conn.expiration_ms, 6_000);
}

#[test]
fn test_default_config_roundtrip_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("default.json");

    create_default_config(&path).unwrap();
    let config = load_config(&path).unwrap();

    assert_eq!(config.timeouts.get(&TimeoutClass::OtherFirst), Some(&60));
    assert_eq!(config.timeouts.get(&TimeoutClass::OtherMultiple), Some(&60));
    assert_eq!(config.timeouts.get(&TimeoutClass::OtherBidir), Some(&30));
    assert!(config.zones.is_empty());
    assert!(!config.offload.enabled);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = load_config(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
}

#[test]
fn test_invalid_files_rejected() {
    let cases = [
        r#"{ "timeouts": { "other-first": 0 } }"#,
        r#"{ "timeouts": { "other-sometimes": 10 } }"#,
        r#"{ "zones": [ { "zone": 1 }, { "zone": 1 } ] }"#,
        r#"{ "table": { "max_connections": 0 } }"#,
        r#"{ "offload": { "enabled": true, "channel_capacity": 0 } }"#,
        r#"{ "log": { "level": "chatty" } }"#,
        "not json",
    ];

    for json in cases {
        assert!(load_config_str(json).is_err(), "accepted: {json}");
    }
}
