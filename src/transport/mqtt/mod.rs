//! MQTT implementation of the broker link
//!
//! Pure option construction and error types live in [`connection`]; the
//! impure rumqttc embedding lives in [`client`].

pub mod client;
pub mod connection;

pub use client::MqttLink;
pub use connection::{configure_mqtt_options, MqttError};
