//! di2mqtt - Digital Input Monitoring Agent
//!
//! A long-running agent that mirrors a fixed bank of digital inputs onto
//! retained MQTT topics and keeps the broker link alive across network
//! failures.
//!
//! # Overview
//!
//! - Edge detection over a fixed, configuration-defined set of channels
//! - Bounded-retry connectivity supervision that never starves the scan loop
//! - Periodic liveness heartbeat tolerant of a wrapping millisecond counter
//! - Retained, at-least-once status messages so late-joining subscribers
//!   observe the last known state immediately
//!
//! # Quick Start
//!
//! ```rust
//! use di2mqtt::monitor::HeartbeatScheduler;
//! use di2mqtt::protocol::{encode_state, status_topic};
//!
//! // Topics are fixed: {device}/status/{channel} with "1"/"0" payloads.
//! assert_eq!(status_topic("garage", "door"), "garage/status/door");
//! assert_eq!(encode_state(true), b"1");
//!
//! // The heartbeat fires once per elapsed interval.
//! let mut heartbeat = HeartbeatScheduler::new("garage", 60_000);
//! assert!(heartbeat.tick(0).is_none());
//! let beat = heartbeat.tick(60_000).unwrap();
//! assert_eq!(beat[0].topic, "garage/debug/alive");
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod monitor;
pub mod observability;
pub mod protocol;
pub mod testing;
pub mod transport;

pub use clock::{Clock, MonotonicClock};
pub use config::{EndpointSnapshot, MonitorConfig};
pub use error::{AgentError, AgentResult};
pub use monitor::{
    ChangePublisher, ConnectionState, ConnectivitySupervisor, HeartbeatScheduler, InputBank,
    MonitorLoop, PublishResult, RetryPolicy,
};
pub use protocol::{OutboundMessage, QosLevel};
pub use transport::mqtt::MqttLink;
pub use transport::BrokerLink;
