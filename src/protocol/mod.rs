//! Wire-facing naming and message construction
//!
//! The topic layout and payload alphabet are fixed for compatibility with
//! existing subscribers; see [`topics`] for the exact shapes.

pub mod messages;
pub mod topics;

pub use messages::{encode_state, OutboundMessage, QosLevel};
pub use topics::{alive_topic, status_topic, validate_identifier, version_topic, ValidationError};
