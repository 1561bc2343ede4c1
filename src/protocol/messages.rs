//! Outbound message types and payload encoding
//!
//! Payloads are fixed ASCII: `"1"`/`"0"` for channel state and liveness,
//! the crate version string for the version topic. No other wire format is
//! in scope.

/// Delivery guarantee requested for an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QosLevel {
    /// Fire once, no broker acknowledgment.
    AtMostOnce,
    /// Broker acknowledges; may be delivered more than once.
    AtLeastOnce,
}

/// A fully addressed message ready to hand to the broker link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QosLevel,
    pub retain: bool,
}

impl OutboundMessage {
    /// Retained at-least-once message, the shape used for everything a
    /// late-joining subscriber must observe.
    pub fn retained(topic: String, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic,
            payload: payload.into(),
            qos: QosLevel::AtLeastOnce,
            retain: true,
        }
    }
}

/// Encode a logical pin state as its wire payload.
pub fn encode_state(state: bool) -> &'static [u8] {
    if state {
        b"1"
    } else {
        b"0"
    }
}
