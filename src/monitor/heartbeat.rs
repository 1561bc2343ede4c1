//! Periodic liveness reporting
//!
//! Fires on a fixed interval regardless of input activity. The elapsed-time
//! check tolerates a wrapping millisecond counter: `now < last` is read as
//! "an interval elapsed", never as a negative duration.

use crate::protocol::{alive_topic, encode_state, version_topic, OutboundMessage};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Emits alive/version messages once per elapsed interval.
#[derive(Debug)]
pub struct HeartbeatScheduler {
    alive_topic: String,
    version_topic: String,
    interval_ms: u64,
    last_emitted_at_ms: u64,
}

impl HeartbeatScheduler {
    pub fn new(device: &str, interval_ms: u64) -> Self {
        Self {
            alive_topic: alive_topic(device),
            version_topic: version_topic(device),
            interval_ms,
            last_emitted_at_ms: 0,
        }
    }

    fn due(&self, now_ms: u64) -> bool {
        now_ms < self.last_emitted_at_ms
            || now_ms - self.last_emitted_at_ms >= self.interval_ms
    }

    /// Fire at most once per satisfied interval.
    ///
    /// Returns the liveness pair to publish, or `None` when the interval
    /// has not elapsed. Connectivity is none of this component's business;
    /// the caller treats publish failures as non-fatal.
    pub fn tick(&mut self, now_ms: u64) -> Option<[OutboundMessage; 2]> {
        if !self.due(now_ms) {
            return None;
        }
        self.last_emitted_at_ms = now_ms;

        Some([
            OutboundMessage::retained(self.alive_topic.clone(), encode_state(true)),
            OutboundMessage::retained(self.version_topic.clone(), VERSION.as_bytes()),
        ])
    }
}
