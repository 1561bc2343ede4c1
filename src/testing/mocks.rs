//! Mock implementations for testing
//!
//! Recording doubles for the broker link, the input source, and the clock,
//! so every component and the whole scan loop can be exercised without
//! hardware or a broker.

use crate::clock::Clock;
use crate::config::EndpointSnapshot;
use crate::input::{InputHandle, InputSource};
use crate::protocol::QosLevel;
use crate::transport::mqtt::MqttError;
use crate::transport::BrokerLink;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One message the mock link accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QosLevel,
    pub retain: bool,
}

/// Mock broker link recording every call made against it.
///
/// Clones share their internals, so a test can keep a handle while the
/// monitor loop owns the link.
#[derive(Debug, Clone, Default)]
pub struct MockLink {
    published: Arc<Mutex<Vec<PublishedMessage>>>,
    connect_calls: Arc<AtomicU32>,
    pump_calls: Arc<AtomicU32>,
    disconnect_calls: Arc<AtomicU32>,
    failing_connects: Arc<AtomicUsize>,
    connected: Arc<AtomicBool>,
    fail_publish: Arc<AtomicBool>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link whose next `count` connect calls fail. Pass `usize::MAX` for a
    /// broker that never comes back.
    pub fn failing_connects(count: usize) -> Self {
        let link = Self::default();
        link.failing_connects.store(count, Ordering::SeqCst);
        link
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    pub fn connect_calls(&self) -> u32 {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn pump_calls(&self) -> u32 {
        self.pump_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> u32 {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Simulate the broker dropping the session out from under us.
    pub fn drop_session(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn clear_history(&self) {
        self.published.lock().unwrap().clear();
    }
}

#[async_trait]
impl BrokerLink for MockLink {
    type Error = MqttError;

    async fn connect(&mut self, _endpoint: &EndpointSnapshot) -> Result<(), Self::Error> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failing_connects.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.failing_connects.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(MqttError::ConnectionFailedStr(
                "mock broker refused connection".to_string(),
            ));
        }

        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Self::Error> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QosLevel,
        retain: bool,
    ) -> Result<(), Self::Error> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(MqttError::PublishFailed(
                "mock publish failure".to_string().into(),
            ));
        }

        self.published.lock().unwrap().push(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
            retain,
        });
        Ok(())
    }

    async fn pump(&mut self) -> Result<(), Self::Error> {
        self.pump_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock input source with externally settable pin states.
#[derive(Debug, Clone)]
pub struct MockInputSource {
    states: Arc<Mutex<Vec<bool>>>,
}

impl MockInputSource {
    pub fn new(initial: Vec<bool>) -> Self {
        Self {
            states: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn set_state(&self, index: usize, state: bool) {
        self.states.lock().unwrap()[index] = state;
    }
}

impl InputSource for MockInputSource {
    fn read_digital(&self, handle: InputHandle) -> bool {
        self.states.lock().unwrap()[handle.0]
    }
}

/// Mock clock with externally settable time.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: Arc<AtomicU64>,
}

impl MockClock {
    pub fn new(start_ms: u64) -> Self {
        let clock = Self::default();
        clock.now.store(start_ms, Ordering::SeqCst);
        clock
    }

    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
