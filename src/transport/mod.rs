//! Transport layer for broker communication
//!
//! This module provides the broker-link abstraction the core consumes and
//! the MQTT implementation of it. The abstraction exists so the monitor
//! loop can be exercised against recording mocks without a broker.

use crate::config::EndpointSnapshot;
use crate::protocol::QosLevel;

pub mod mqtt;

/// Broker link: connectivity plus message publishing.
///
/// Exactly one component (the connectivity supervisor) owns a value of this
/// trait and is allowed to mutate its connection state; everything else only
/// publishes through a shared reference.
#[async_trait::async_trait]
pub trait BrokerLink: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Establish a broker session from one endpoint/credentials snapshot.
    /// Errors are transient and reported upward, never fatal.
    async fn connect(&mut self, endpoint: &EndpointSnapshot) -> Result<(), Self::Error>;

    /// Tear the session down. Best effort.
    async fn disconnect(&mut self) -> Result<(), Self::Error>;

    /// Whether the link currently holds a live session.
    fn is_connected(&self) -> bool;

    /// Publish one message. A failure here is surfaced to the caller and
    /// logged; it must not alter connection state.
    async fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QosLevel,
        retain: bool,
    ) -> Result<(), Self::Error>;

    /// Process pending inbound and keepalive traffic. Must be invoked every
    /// loop iteration while connected; bounded work per call.
    async fn pump(&mut self) -> Result<(), Self::Error>;
}

/// Type alias for the production MQTT link
pub type MqttTransport = mqtt::MqttLink;
