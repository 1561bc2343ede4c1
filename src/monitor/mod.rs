//! Scan-loop composition
//!
//! One cooperative loop, fixed order per iteration: ensure connectivity,
//! drain transport callbacks while connected, scan inputs, tick the
//! heartbeat, then a bounded end-of-iteration delay. Connection state
//! transitions happen only in the connectivity step: a failing publish
//! never masks a live link, and a dead link is confirmed by the next
//! iteration's connectivity check rather than inferred from one failure.

pub mod channel;
pub mod heartbeat;
pub mod publisher;
pub mod supervisor;

pub use channel::{Channel, InputBank};
pub use heartbeat::HeartbeatScheduler;
pub use publisher::{ChangePublisher, PublishResult};
pub use supervisor::{ConnectionState, ConnectivitySupervisor, RetryPolicy};

use crate::clock::Clock;
use crate::config::MonitorConfig;
use crate::input::InputSource;
use crate::protocol::{alive_topic, encode_state, QosLevel};
use crate::transport::BrokerLink;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// The control loop context: owns every component and all mutable state.
pub struct MonitorLoop<L: BrokerLink, S: InputSource, C: Clock> {
    config: MonitorConfig,
    supervisor: ConnectivitySupervisor<L>,
    bank: InputBank,
    source: S,
    heartbeat: HeartbeatScheduler,
    clock: C,
}

impl<L, S, C> MonitorLoop<L, S, C>
where
    L: BrokerLink,
    S: InputSource,
    C: Clock,
{
    /// Wire the components from configuration. Channels are primed with an
    /// initial read here, before the first scan.
    pub fn new(config: MonitorConfig, link: L, source: S, clock: C) -> Self {
        let policy = RetryPolicy {
            max_attempts: config.monitor.connect_attempts,
            retry_delay: Duration::from_millis(config.monitor.retry_delay_ms),
        };
        let bank = InputBank::new(&config.device.name, &config.inputs, &source);
        let heartbeat = HeartbeatScheduler::new(
            &config.device.name,
            config.mqtt.heartbeat_interval_secs * 1000,
        );

        Self {
            supervisor: ConnectivitySupervisor::new(link, policy),
            bank,
            source,
            heartbeat,
            clock,
            config,
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    pub fn bank(&self) -> &InputBank {
        &self.bank
    }

    /// One loop iteration.
    pub async fn step(&mut self) -> ConnectionState {
        let snapshot = self.config.mqtt.endpoint_snapshot();
        let state = self.supervisor.ensure_connected(snapshot.as_ref()).await;

        if state == ConnectionState::Connected {
            self.supervisor.pump_callbacks().await;
        }

        ChangePublisher::scan(&mut self.bank, &self.source, self.supervisor.link()).await;

        if let Some(messages) = self.heartbeat.tick(self.clock.now_ms()) {
            for msg in messages {
                if let Err(e) = self
                    .supervisor
                    .link()
                    .publish(&msg.topic, &msg.payload, msg.qos, msg.retain)
                    .await
                {
                    warn!(topic = %msg.topic, error = %e, "heartbeat publish failed");
                }
            }
        }

        state
    }

    /// Run until the shutdown flag flips, then tear down the link.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            device = %self.config.device.name,
            channels = self.bank.len(),
            "monitor loop starting"
        );
        let delay = Duration::from_millis(self.config.monitor.scan_interval_ms);

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.step().await;

            // End-of-iteration delay, interruptible by shutdown.
            tokio::select! {
                changed = shutdown.changed() => {
                    match changed {
                        Ok(()) if *shutdown.borrow() => break,
                        Ok(()) => {}
                        // Sender gone; nobody can signal us anymore, so
                        // fall back to a plain delay.
                        Err(_) => tokio::time::sleep(delay).await,
                    }
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.teardown().await;
    }

    /// Best-effort goodbye: flip the retained alive topic to "0" so
    /// subscribers see an orderly exit, then drop the session.
    async fn teardown(&mut self) {
        info!("monitor loop stopping");

        if self.supervisor.state() == ConnectionState::Connected {
            let topic = alive_topic(&self.config.device.name);
            if let Err(e) = self
                .supervisor
                .link()
                .publish(&topic, encode_state(false), QosLevel::AtLeastOnce, true)
                .await
            {
                warn!(error = %e, "shutdown liveness publish failed");
            }
        }

        self.supervisor.shutdown().await;
    }
}
