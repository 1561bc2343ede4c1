//! Pure connection configuration for the MQTT link
//!
//! This module contains the endpoint-to-options translation and the
//! transport error taxonomy. Nothing here performs I/O.

use crate::config::EndpointSnapshot;
use crate::protocol::{alive_topic, encode_state};
use rumqttc::Transport as RumqttcTransport;
use rumqttc::v5::mqttbytes::v5::LastWill;
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::MqttOptions;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// MQTT transport errors
#[derive(Debug, Error)]
pub enum MqttError {
    #[error("Connection failed")]
    ConnectionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Publishing failed")]
    PublishFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Invalid broker URL: {0}")]
    InvalidBrokerUrl(String),
    #[error("Not connected to broker")]
    NotConnected,
    #[error("Connection failed: {0}")]
    ConnectionFailedStr(String),
}

/// Translate an endpoint snapshot into rumqttc options.
///
/// The client id gets a per-attempt timestamp suffix so a retrying agent
/// never collides with its own half-dead session on the broker.
pub fn configure_mqtt_options(
    device_name: &str,
    endpoint: &EndpointSnapshot,
) -> Result<MqttOptions, MqttError> {
    let url = Url::parse(&endpoint.broker_url)
        .map_err(|_| MqttError::InvalidBrokerUrl(endpoint.broker_url.clone()))?;

    let host = url
        .host_str()
        .ok_or_else(|| MqttError::InvalidBrokerUrl(endpoint.broker_url.clone()))?;
    let port = url
        .port()
        .unwrap_or(if url.scheme() == "mqtts" { 8883 } else { 1883 });

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let client_id = format!("{device_name}-{timestamp}");
    let mut mqtt_options = MqttOptions::new(client_id, host, port);

    if url.scheme() == "mqtts" {
        let transport = RumqttcTransport::tls_with_default_config();
        mqtt_options.set_transport(transport);
    }

    if let Some(username) = &endpoint.username {
        let password = endpoint.password.clone().unwrap_or_default();
        mqtt_options.set_credentials(username.clone(), password);
    }

    mqtt_options.set_keep_alive(Duration::from_secs(30));

    // Last will: if the session dies without a goodbye, subscribers see the
    // alive topic flip to "0" instead of a stale "1".
    let lwt = LastWill::new(
        alive_topic(device_name),
        encode_state(false),
        QoS::AtLeastOnce,
        true,
        None,
    );
    mqtt_options.set_last_will(lwt);

    Ok(mqtt_options)
}
