//! Impure I/O for the MQTT link
//!
//! The rumqttc event loop is normally driven by a background task; here it
//! is embedded in the scan loop instead. `connect` drives it until the
//! broker acknowledges the session, and `pump` drains a bounded slice of
//! events once per iteration, which also services keepalives and flushes
//! queued publishes.

use super::connection::{configure_mqtt_options, MqttError};
use crate::config::EndpointSnapshot;
use crate::protocol::QosLevel;
use crate::transport::BrokerLink;
use async_trait::async_trait;
use rumqttc::v5::mqttbytes::v5::{ConnectReturnCode, Packet};
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::{AsyncClient, Event, EventLoop};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Overall budget for one connection attempt, ConnAck included.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-poll wait inside `pump`; expiring means nothing is pending.
const PUMP_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Events drained per `pump` call, so one chatty broker cannot starve the
/// input scan.
const MAX_EVENTS_PER_PUMP: usize = 16;

fn map_qos(qos: QosLevel) -> QoS {
    match qos {
        QosLevel::AtMostOnce => QoS::AtMostOnce,
        QosLevel::AtLeastOnce => QoS::AtLeastOnce,
    }
}

/// MQTT broker link driven cooperatively from the scan loop.
pub struct MqttLink {
    device_name: String,
    client: Option<AsyncClient>,
    event_loop: Option<EventLoop>,
    connected: bool,
}

impl MqttLink {
    pub fn new(device_name: &str) -> Self {
        Self {
            device_name: device_name.to_string(),
            client: None,
            event_loop: None,
            connected: false,
        }
    }

    /// Drive the event loop until the broker acknowledges the session.
    async fn await_connack(event_loop: &mut EventLoop) -> Result<(), MqttError> {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(packet)) => {
                    if let Packet::ConnAck(ack) = &packet {
                        if ack.code == ConnectReturnCode::Success {
                            return Ok(());
                        }
                        return Err(MqttError::ConnectionFailedStr(format!(
                            "broker rejected session: {:?}",
                            ack.code
                        )));
                    }
                    debug!(target: "mqtt_transport", ?packet, "event before ConnAck");
                }
                Ok(Event::Outgoing(_)) => {}
                Err(e) => return Err(MqttError::ConnectionFailed(Box::new(e))),
            }
        }
    }
}

#[async_trait]
impl BrokerLink for MqttLink {
    type Error = MqttError;

    async fn connect(&mut self, endpoint: &EndpointSnapshot) -> Result<(), Self::Error> {
        // Drop any half-dead session before dialing again.
        self.client = None;
        self.event_loop = None;
        self.connected = false;

        let mqtt_options = configure_mqtt_options(&self.device_name, endpoint)?;
        let (client, mut event_loop) = AsyncClient::new(mqtt_options, 10);

        match tokio::time::timeout(CONNECT_TIMEOUT, Self::await_connack(&mut event_loop)).await {
            Ok(Ok(())) => {
                info!(broker = %endpoint.broker_url, "MQTT session established");
                self.client = Some(client);
                self.event_loop = Some(event_loop);
                self.connected = true;
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(MqttError::ConnectionFailedStr(
                "no ConnAck within connection timeout".to_string(),
            )),
        }
    }

    async fn disconnect(&mut self) -> Result<(), Self::Error> {
        if let Some(client) = self.client.take() {
            // Best effort: the broker may already be gone.
            if let Err(e) = client.disconnect().await {
                debug!(target: "mqtt_transport", error = %e, "disconnect request failed");
            }
        }
        self.event_loop = None;
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QosLevel,
        retain: bool,
    ) -> Result<(), Self::Error> {
        let client = self.client.as_ref().ok_or(MqttError::NotConnected)?;
        client
            .publish(topic, map_qos(qos), retain, payload.to_vec())
            .await
            .map_err(|e| MqttError::PublishFailed(Box::new(e)))
    }

    async fn pump(&mut self) -> Result<(), Self::Error> {
        if !self.connected {
            return Ok(());
        }
        let Some(event_loop) = self.event_loop.as_mut() else {
            return Ok(());
        };

        for _ in 0..MAX_EVENTS_PER_PUMP {
            match tokio::time::timeout(PUMP_POLL_TIMEOUT, event_loop.poll()).await {
                // Nothing pending within the budget; the iteration is done.
                Err(_) => break,
                Ok(Ok(Event::Incoming(packet))) => {
                    if matches!(packet, Packet::Disconnect(_)) {
                        warn!(target: "mqtt_transport", "broker sent DISCONNECT");
                        self.connected = false;
                        return Ok(());
                    }
                    debug!(target: "mqtt_transport", ?packet, "incoming event");
                }
                Ok(Ok(Event::Outgoing(_))) => {}
                Ok(Err(e)) => {
                    self.connected = false;
                    return Err(MqttError::ConnectionFailed(Box::new(e)));
                }
            }
        }
        Ok(())
    }
}
