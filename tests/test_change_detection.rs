//! Integration tests for edge detection through the full scan loop
//!
//! Exercises MonitorLoop::step with mock transport, inputs, and clock, and
//! asserts on the exact messages that reach the broker link.

use di2mqtt::config::{DeviceSection, InputSection, MonitorConfig, MonitorSection, MqttSection};
use di2mqtt::monitor::MonitorLoop;
use di2mqtt::protocol::QosLevel;
use di2mqtt::testing::mocks::{MockClock, MockInputSource, MockLink, PublishedMessage};

fn test_config(channels: &[&str]) -> MonitorConfig {
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
        inputs: channels
            .iter()
            .enumerate()
            .map(|(i, name)| InputSection {
                name: name.to_string(),
                pin: i as u8,
            })
            .collect(),
    }
}

fn status_messages(link: &MockLink) -> Vec<PublishedMessage> {
    link.published()
        .into_iter()
        .filter(|msg| msg.topic.contains("/status/"))
        .collect()
}

#[tokio::test]
async fn test_three_channel_scenario() {
    let config = test_config(&["in1", "in2", "in3"]);
    let link = MockLink::new();
    let handle = link.clone();
    let source = MockInputSource::new(vec![false, false, false]);
    let clock = MockClock::new(0);
    let mut monitor = MonitorLoop::new(config, link, source.clone(), clock);

    // Scan 1: channel 1 rises.
    source.set_state(0, true);
    monitor.step().await;

    let status = status_messages(&handle);
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].topic, "garage/status/in1");
    assert_eq!(status[0].payload, b"1");
    assert_eq!(status[0].qos, QosLevel::AtLeastOnce);
    assert!(status[0].retain);

    // Scan 2: nothing changed, nothing published.
    monitor.step().await;
    assert_eq!(status_messages(&handle).len(), 1);
}

#[tokio::test]
async fn test_both_edges_are_reported() {
    let config = test_config(&["door"]);
    let link = MockLink::new();
    let handle = link.clone();
    let source = MockInputSource::new(vec![false]);
    let mut monitor = MonitorLoop::new(config, link, source.clone(), MockClock::new(0));

    source.set_state(0, true);
    monitor.step().await;
    source.set_state(0, false);
    monitor.step().await;

    let status = status_messages(&handle);
    assert_eq!(status.len(), 2);
    assert_eq!(status[0].payload, b"1");
    assert_eq!(status[1].payload, b"0");
}

#[tokio::test]
async fn test_simultaneous_transitions_follow_configuration_order() {
    let config = test_config(&["in1", "in2", "in3"]);
    let link = MockLink::new();
    let handle = link.clone();
    let source = MockInputSource::new(vec![false, false, false]);
    let mut monitor = MonitorLoop::new(config, link, source.clone(), MockClock::new(0));

    source.set_state(2, true);
    source.set_state(1, true);
    monitor.step().await;

    let status = status_messages(&handle);
    assert_eq!(status.len(), 2);
    assert_eq!(status[0].topic, "garage/status/in2");
    assert_eq!(status[1].topic, "garage/status/in3");
}

#[tokio::test]
async fn test_transitions_published_even_while_disconnected() {
    let mut config = test_config(&["door"]);
    config.mqtt.broker_url = String::new(); // never configured
    let link = MockLink::new();
    let handle = link.clone();
    let source = MockInputSource::new(vec![false]);
    let mut monitor = MonitorLoop::new(config, link, source.clone(), MockClock::new(0));

    source.set_state(0, true);
    monitor.step().await;

    // The publish call is still issued; the transport is where failure
    // would surface, not the scan.
    assert_eq!(status_messages(&handle).len(), 1);
    assert_eq!(handle.connect_calls(), 0);
}

#[tokio::test]
async fn test_initial_states_are_not_republished() {
    let config = test_config(&["door", "window"]);
    let link = MockLink::new();
    let handle = link.clone();
    // One input already high at startup: priming must swallow it.
    let source = MockInputSource::new(vec![true, false]);
    let mut monitor = MonitorLoop::new(config, link, source.clone(), MockClock::new(0));

    monitor.step().await;

    assert!(status_messages(&handle).is_empty());
}
