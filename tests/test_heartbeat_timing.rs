//! Integration tests for heartbeat timing through the scan loop
//!
//! Drives MonitorLoop::step with a mock clock and asserts on the liveness
//! messages reaching the link, including across counter wraparound.

use di2mqtt::config::{DeviceSection, MonitorConfig, MonitorSection, MqttSection};
use di2mqtt::monitor::MonitorLoop;
use di2mqtt::testing::mocks::{MockClock, MockInputSource, MockLink, PublishedMessage};

fn test_config() -> MonitorConfig {
    MonitorConfig {
        device: DeviceSection {
            name: "garage".to_string(),
        },
        mqtt: MqttSection {
            broker_url: "mqtt://localhost:1883".to_string(),
            username_env: None,
            password_env: None,
            heartbeat_interval_secs: 60,
        },
        monitor: MonitorSection {
            scan_interval_ms: 10,
            connect_attempts: 3,
            retry_delay_ms: 1,
        },
        inputs: vec![],
    }
}

fn alive_messages(link: &MockLink) -> Vec<PublishedMessage> {
    link.published()
        .into_iter()
        .filter(|msg| msg.topic == "garage/debug/alive")
        .collect()
}

#[tokio::test]
async fn test_fires_exactly_once_per_interval() {
    let link = MockLink::new();
    let handle = link.clone();
    let clock = MockClock::new(0);
    let mut monitor = MonitorLoop::new(
        test_config(),
        link,
        MockInputSource::new(vec![]),
        clock.clone(),
    );

    for now in [0u64, 30_000, 60_001, 90_000] {
        clock.set(now);
        monitor.step().await;
    }

    // Only the 60_001 iteration crossed a full interval.
    assert_eq!(alive_messages(&handle).len(), 1);

    // Another full interval from 60_001 elapses at 120_001.
    clock.set(120_001);
    monitor.step().await;
    assert_eq!(alive_messages(&handle).len(), 2);
}

#[tokio::test]
async fn test_version_accompanies_alive() {
    let link = MockLink::new();
    let handle = link.clone();
    let clock = MockClock::new(0);
    let mut monitor = MonitorLoop::new(
        test_config(),
        link,
        MockInputSource::new(vec![]),
        clock.clone(),
    );

    clock.set(60_000);
    monitor.step().await;

    let published = handle.published();
    let version: Vec<_> = published
        .iter()
        .filter(|msg| msg.topic == "garage/debug/version")
        .collect();
    assert_eq!(version.len(), 1);
    assert_eq!(version[0].payload, env!("CARGO_PKG_VERSION").as_bytes());
    assert_eq!(alive_messages(&handle).len(), 1);
    assert_eq!(alive_messages(&handle)[0].payload, b"1");
}

#[tokio::test]
async fn test_wraparound_fires_instead_of_stalling() {
    let link = MockLink::new();
    let handle = link.clone();
    let clock = MockClock::new(0);
    let mut monitor = MonitorLoop::new(
        test_config(),
        link,
        MockInputSource::new(vec![]),
        clock.clone(),
    );

    clock.set(4_294_960_000);
    monitor.step().await;
    assert_eq!(alive_messages(&handle).len(), 1);

    // The counter wraps; a stalled scheduler would wait ~49 days here.
    clock.set(500);
    monitor.step().await;
    assert_eq!(alive_messages(&handle).len(), 2);
}

#[tokio::test]
async fn test_heartbeat_independent_of_input_activity() {
    let link = MockLink::new();
    let handle = link.clone();
    let clock = MockClock::new(0);
    let mut monitor = MonitorLoop::new(
        test_config(),
        link,
        MockInputSource::new(vec![]),
        clock.clone(),
    );

    // Many quiet scans, then an interval boundary: exactly one beat.
    for now in (0..=60_000u64).step_by(10_000) {
        clock.set(now);
        monitor.step().await;
    }

    assert_eq!(alive_messages(&handle).len(), 1);
}
