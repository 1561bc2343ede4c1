//! Connectivity lifecycle for the broker link
//!
//! The supervisor is the only component allowed to transition connection
//! state or mutate the link. One `ensure_connected` call runs at most one
//! bounded attempt sequence; exhaustion is reported, not fatal, and the
//! caller simply tries again on a later loop iteration.

use crate::config::EndpointSnapshot;
use crate::transport::BrokerLink;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection state as the rest of the loop sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Bounded retry policy for one attempt sequence.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per sequence; at least 1.
    pub max_attempts: u32,
    /// Sleep between attempts within a sequence.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Worst-case sleep time of one sequence: the delay runs between
    /// attempts, not after the last failure.
    pub fn max_total_delay(&self) -> Duration {
        self.retry_delay * self.max_attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(3000),
        }
    }
}

/// Attempts remaining within the current sequence.
#[derive(Debug)]
struct RetryBudget {
    attempts_remaining: u32,
}

impl RetryBudget {
    fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempts_remaining: policy.max_attempts,
        }
    }

    /// Spend one attempt; true while the sequence may continue.
    fn consume(&mut self) -> bool {
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        self.attempts_remaining > 0
    }
}

/// Drives network and broker connection state with bounded retry.
pub struct ConnectivitySupervisor<L: BrokerLink> {
    link: L,
    state: ConnectionState,
    policy: RetryPolicy,
}

impl<L: BrokerLink> ConnectivitySupervisor<L> {
    pub fn new(link: L, policy: RetryPolicy) -> Self {
        Self {
            link,
            state: ConnectionState::Disconnected,
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Shared access to the link for publishing. Connection state stays
    /// exclusively with the supervisor.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Drain pending transport callbacks. A pump failure marks the link
    /// dead internally; the next `ensure_connected` call observes that and
    /// runs a fresh attempt sequence.
    pub async fn pump_callbacks(&mut self) {
        if let Err(e) = self.link.pump().await {
            warn!(error = %e, "transport pump failed");
        }
    }

    /// Bring the link up if it is not already.
    ///
    /// `None` means no broker is configured: the supervisor reports
    /// Disconnected without touching the link. Otherwise up to
    /// `max_attempts` connection attempts run, separated by the fixed
    /// retry delay; budget exhaustion reports Disconnected and leaves the
    /// supervisor ready for the next invocation.
    pub async fn ensure_connected(
        &mut self,
        endpoint: Option<&EndpointSnapshot>,
    ) -> ConnectionState {
        let Some(endpoint) = endpoint else {
            self.state = ConnectionState::Disconnected;
            return self.state;
        };

        if self.link.is_connected() {
            self.state = ConnectionState::Connected;
            return self.state;
        }

        let mut budget = RetryBudget::new(&self.policy);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.state = ConnectionState::Connecting;
            info!(broker = %endpoint.broker_url, attempt, "attempting broker connection");

            match self.link.connect(endpoint).await {
                Ok(()) => {
                    self.state = ConnectionState::Connected;
                    info!(broker = %endpoint.broker_url, "broker connection established");
                    return self.state;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "broker connection attempt failed");
                    if !budget.consume() {
                        break;
                    }
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
            }
        }

        debug!(
            max_attempts = self.policy.max_attempts,
            "attempt budget exhausted"
        );
        self.state = ConnectionState::Disconnected;
        self.state
    }

    /// Best-effort teardown for graceful shutdown.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.link.disconnect().await {
            warn!(error = %e, "broker disconnect failed");
        }
        self.state = ConnectionState::Disconnected;
    }
}
