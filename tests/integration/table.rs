//! Connection table end-to-end tests
//!
//! Drives `ConnTable` the way an engine would: create on the first packet,
//! update on later packets of both directions, replay hardware activity and
//! finally remove the connection.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};

use conntrack_other::connection::{ConnTable, FlowKey, OtherState, UpdateResult};
use conntrack_other::{Config, ConntrackError, CtState, Packet, TimeoutClass, ZoneConfig};

// ============================================================================
// Test Helpers
// ============================================================================

fn flow(last_octet: u8, nw_proto: u8, zone: u16) -> FlowKey {
    FlowKey::new(
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, last_octet)),
        IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1)),
        nw_proto,
        zone,
    )
}

fn state(table: &ConnTable, key: &FlowKey) -> OtherState {
    table
        .get(key)
        .and_then(|conn| conn.as_other().map(|o| o.state))
        .expect("tracked generic connection")
}

fn offload_config() -> Config {
    let mut config = Config::default();
    config.offload.enabled = true;
    config.offload.channel_capacity = 4;
    config
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[test]
fn test_gre_flow_lifecycle() {
    let (table, _) = ConnTable::from_config(&Config::default()).unwrap();
    let key = flow(1, 47, 0);

    assert_eq!(table.process(key, false, None, 0).unwrap(), UpdateResult::New);
    assert_eq!(state(&table, &key), OtherState::First);

    assert_eq!(table.process(key, false, None, 1_000).unwrap(), UpdateResult::Valid);
    assert_eq!(state(&table, &key), OtherState::Multiple);
    assert_eq!(table.get(&key).unwrap().expiration_ms, 61_000);

    assert_eq!(table.process(key, true, None, 2_000).unwrap(), UpdateResult::Valid);
    assert_eq!(state(&table, &key), OtherState::Bidir);
    assert_eq!(table.get(&key).unwrap().expiration_ms, 32_000);

    assert!(table.get(&key).unwrap().is_expired(32_000));
    assert!(table.remove(&key));
    assert!(table.is_empty());

    let snapshot = table.stats().snapshot();
    assert_eq!(snapshot.created, 1);
    assert_eq!(snapshot.updated, 2);
    assert_eq!(snapshot.removed, 1);
    assert_eq!(snapshot.active, 0);
}

#[test]
fn test_every_protocol_number_is_tracked() {
    let (table, _) = ConnTable::from_config(&Config::default()).unwrap();

    for nw_proto in 0..=u8::MAX {
        let key = flow(1, nw_proto, 0);
        assert_eq!(table.process(key, false, None, 0).unwrap(), UpdateResult::New);
    }

    assert_eq!(table.len(), 256);
}

#[test]
fn test_zones_are_separate_connections() {
    let mut config = Config::default();
    config.zones.push(ZoneConfig {
        zone: 2,
        timeouts: BTreeMap::from([(TimeoutClass::OtherBidir, 3)]),
    });
    let (table, _) = ConnTable::from_config(&config).unwrap();

    let zone0 = flow(1, 132, 0);
    let zone2 = flow(1, 132, 2);
    table.process(zone0, false, None, 0).unwrap();
    table.process(zone2, false, None, 0).unwrap();

    table.process(zone0, true, None, 100).unwrap();
    table.process(zone2, true, None, 100).unwrap();

    assert_eq!(table.get(&zone0).unwrap().expiration_ms, 30_100);
    assert_eq!(table.get(&zone2).unwrap().expiration_ms, 3_100);
    assert_eq!(table.len(), 2);
}

#[test]
fn test_limit_rejects_only_new_flows() {
    let mut config = Config::default();
    config.table.max_connections = 2;
    let (table, _) = ConnTable::from_config(&config).unwrap();

    table.process(flow(1, 47, 0), false, None, 0).unwrap();
    table.process(flow(2, 47, 0), false, None, 0).unwrap();

    let err = table.process(flow(3, 47, 0), false, None, 0).unwrap_err();
    assert!(matches!(err, ConntrackError::TableFull { current: 2, max: 2 }));
    assert!(err.is_recoverable());

    assert!(table.remove(&flow(1, 47, 0)));
    assert_eq!(table.process(flow(3, 47, 0), false, None, 0).unwrap(), UpdateResult::New);
}

// ============================================================================
// Hardware Sync Tests
// ============================================================================

#[test]
fn test_offload_events_follow_updates() {
    let (table, rx) = ConnTable::from_config(&offload_config()).unwrap();
    let mut rx = rx.expect("offload receiver");
    let key = flow(9, 41, 5);
    let pkt = Packet::new(vec![0x60, 0, 0, 0]);

    table.process(key, false, Some(&pkt), 0).unwrap();
    table.process(key, false, Some(&pkt), 10).unwrap();
    table.process(key, true, Some(&pkt), 20).unwrap();
    table.process(key, true, None, 30).unwrap();

    let states: Vec<u8> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|event| {
            assert_eq!(event.zone, 5);
            assert_eq!(event.ct_state, CtState::ESTABLISHED | CtState::TRACKED);
            assert_eq!(event.packet, pkt);
            event.protocol_state
        })
        .collect();

    assert_eq!(
        states,
        vec![OtherState::Multiple.as_u8(), OtherState::Bidir.as_u8()]
    );
}

#[test]
fn test_full_channel_does_not_block_updates() {
    let (table, rx) = ConnTable::from_config(&offload_config()).unwrap();
    let key = flow(9, 47, 0);
    let pkt = Packet::new(vec![1]);

    table.process(key, false, None, 0).unwrap();
    for now in 1..=20 {
        assert_eq!(table.process(key, false, Some(&pkt), now).unwrap(), UpdateResult::Valid);
    }
    assert_eq!(table.get(&key).unwrap().expiration_ms, 20 + 60_000);

    // Closed receiver behaves the same
    drop(rx);
    assert_eq!(table.process(key, true, Some(&pkt), 30).unwrap(), UpdateResult::Valid);
    assert_eq!(state(&table, &key), OtherState::Bidir);
}

#[test]
fn test_hardware_sync_replays_transition() {
    let (table, _rx) = ConnTable::from_config(&offload_config()).unwrap();
    let key = flow(4, 47, 0);

    table.process(key, false, None, 1_000).unwrap();
    table.state_sync(&key, false, 2_000).unwrap();
    assert_eq!(state(&table, &key), OtherState::Multiple);
    assert_eq!(table.get(&key).unwrap().expiration_ms, 62_000);

    table.state_sync(&key, true, 3_000).unwrap();
    assert_eq!(state(&table, &key), OtherState::Bidir);
    assert_eq!(table.get(&key).unwrap().expiration_ms, 33_000);

    assert!(matches!(
        table.state_sync(&flow(5, 47, 0), true, 0),
        Err(ConntrackError::NotFound)
    ));
}
