//! Edge detection and transition publishing
//!
//! Each scan reads every channel once and emits exactly one retained
//! at-least-once message per detected transition, in configuration order.
//! Scans are never suppressed by connectivity state: the publish call is
//! where transport failure surfaces, and a failure is logged, not retried.

use super::channel::InputBank;
use crate::input::InputSource;
use crate::protocol::{encode_state, QosLevel};
use crate::transport::BrokerLink;
use tracing::{debug, warn};

/// Outcome of one transition publish within a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub channel: String,
    pub state: bool,
    pub delivered: bool,
}

/// Detects per-channel state transitions and reports them to the broker.
pub struct ChangePublisher;

impl ChangePublisher {
    /// Scan every channel once.
    ///
    /// A transition updates the channel's current state first, then issues
    /// the publish; the reported-state bookkeeping advances only when the
    /// link accepts the message, so a failed publish leaves the divergence
    /// visible. Unchanged channels produce no traffic at all.
    pub async fn scan<S, L>(bank: &mut InputBank, source: &S, link: &L) -> Vec<PublishResult>
    where
        S: InputSource,
        L: BrokerLink,
    {
        let mut results = Vec::new();

        for channel in bank.channels_mut() {
            let state = source.read_digital(channel.handle());
            let Some(new_state) = channel.observe(state) else {
                continue;
            };

            debug!(
                channel = channel.name(),
                state = new_state,
                "input transition detected"
            );

            let delivered = match link
                .publish(
                    channel.topic(),
                    encode_state(new_state),
                    QosLevel::AtLeastOnce,
                    true,
                )
                .await
            {
                Ok(()) => {
                    channel.mark_reported();
                    true
                }
                Err(e) => {
                    warn!(
                        channel = channel.name(),
                        error = %e,
                        "transition publish failed"
                    );
                    false
                }
            };

            results.push(PublishResult {
                channel: channel.name().to_string(),
                state: new_state,
                delivered,
            });
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputSection;
    use crate::testing::mocks::{MockInputSource, MockLink};

    fn three_channel_bank(source: &MockInputSource) -> InputBank {
        let inputs = vec![
            InputSection {
                name: "in1".to_string(),
                pin: 4,
            },
            InputSection {
                name: "in2".to_string(),
                pin: 17,
            },
            InputSection {
                name: "in3".to_string(),
                pin: 27,
            },
        ];
        InputBank::new("garage", &inputs, source)
    }

    #[tokio::test]
    async fn test_single_transition_publishes_once() {
        let source = MockInputSource::new(vec![false, false, false]);
        let link = MockLink::new();
        let mut bank = three_channel_bank(&source);

        source.set_state(0, true);
        let results = ChangePublisher::scan(&mut bank, &source, &link).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].channel, "in1");
        assert!(results[0].state);
        assert!(results[0].delivered);

        let published = link.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "garage/status/in1");
        assert_eq!(published[0].payload, b"1");
        assert_eq!(published[0].qos, QosLevel::AtLeastOnce);
        assert!(published[0].retain);
    }

    #[tokio::test]
    async fn test_unchanged_inputs_publish_nothing() {
        let source = MockInputSource::new(vec![false, false, false]);
        let link = MockLink::new();
        let mut bank = three_channel_bank(&source);

        source.set_state(0, true);
        ChangePublisher::scan(&mut bank, &source, &link).await;

        // Same reading again: no transitions, no traffic.
        let results = ChangePublisher::scan(&mut bank, &source, &link).await;
        assert!(results.is_empty());
        assert_eq!(link.published().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_order_follows_configuration() {
        let source = MockInputSource::new(vec![false, false, false]);
        let link = MockLink::new();
        let mut bank = three_channel_bank(&source);

        source.set_state(2, true);
        source.set_state(0, true);
        let results = ChangePublisher::scan(&mut bank, &source, &link).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].channel, "in1");
        assert_eq!(results[1].channel, "in3");
    }

    #[tokio::test]
    async fn test_falling_edge_publishes_zero() {
        let source = MockInputSource::new(vec![true]);
        let link = MockLink::new();
        let inputs = vec![InputSection {
            name: "door".to_string(),
            pin: 4,
        }];
        let mut bank = InputBank::new("garage", &inputs, &source);

        source.set_state(0, false);
        ChangePublisher::scan(&mut bank, &source, &link).await;

        let published = link.published();
        assert_eq!(published[0].payload, b"0");
    }

    #[tokio::test]
    async fn test_publish_failure_is_reported_not_retried() {
        let source = MockInputSource::new(vec![false]);
        let link = MockLink::new();
        link.fail_publishes(true);
        let inputs = vec![InputSection {
            name: "door".to_string(),
            pin: 4,
        }];
        let mut bank = InputBank::new("garage", &inputs, &source);

        source.set_state(0, true);
        let results = ChangePublisher::scan(&mut bank, &source, &link).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].delivered);
        // Current state advanced, reported state stayed behind.
        assert!(bank.channels()[0].current_state());
        assert!(!bank.channels()[0].last_reported_state());

        // Input unchanged on the next scan: the lost transition is not
        // re-queued (fire-and-forget).
        let results = ChangePublisher::scan(&mut bank, &source, &link).await;
        assert!(results.is_empty());
    }
}
