//! Monitored channels and their last-known states

use crate::config::InputSection;
use crate::input::{InputHandle, InputSource};
use crate::protocol::topics::status_topic;

/// One monitored digital input and its topic identity.
///
/// `last_reported_state` lags `current_state` until the transition publish
/// for the newest edge has been issued and accepted by the link; it is never
/// updated before the publish call.
#[derive(Debug, Clone)]
pub struct Channel {
    name: String,
    topic: String,
    handle: InputHandle,
    current_state: bool,
    last_reported_state: bool,
}

impl Channel {
    fn new(device: &str, name: &str, handle: InputHandle, initial_state: bool) -> Self {
        Self {
            topic: status_topic(device, name),
            name: name.to_string(),
            handle,
            current_state: initial_state,
            last_reported_state: initial_state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn handle(&self) -> InputHandle {
        self.handle
    }

    pub fn current_state(&self) -> bool {
        self.current_state
    }

    pub fn last_reported_state(&self) -> bool {
        self.last_reported_state
    }

    /// Fold one physical read into the channel. Returns the new state when
    /// it differs from the last observation, `None` otherwise.
    pub(crate) fn observe(&mut self, state: bool) -> Option<bool> {
        if state == self.current_state {
            return None;
        }
        self.current_state = state;
        Some(state)
    }

    /// Record that the latest state reached the broker (fire-and-forget:
    /// an accepted publish call counts as reported).
    pub(crate) fn mark_reported(&mut self) {
        self.last_reported_state = self.current_state;
    }
}

/// The fixed set of monitored channels, in configuration order.
///
/// Created once at startup and mutated every scan cycle; channels are never
/// added or removed during normal operation.
#[derive(Debug)]
pub struct InputBank {
    channels: Vec<Channel>,
}

impl InputBank {
    /// Build the bank from the configured mapping, priming each channel with
    /// an initial read so the first scan reports only genuine transitions.
    pub fn new<S: InputSource>(device: &str, inputs: &[InputSection], source: &S) -> Self {
        let channels = inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let handle = InputHandle(i);
                Channel::new(device, &input.name, handle, source.read_digital(handle))
            })
            .collect();
        Self { channels }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
