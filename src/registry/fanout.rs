//! Event fan-out
//!
//! Pushes a newly accepted event to every subscription whose filters match.
//! Delivery is best effort: a full or closed channel loses that one delivery
//! and the pass continues. Detecting the broken connection and calling
//! `drop_connection` is the transport's job.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;

use crate::event::Event;
use crate::message::RelayMessage;

use super::store::SubscriptionRegistry;

/// Outcome of one fan-out pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Subscriptions whose filters matched
    pub matched: usize,
    /// Envelopes queued on a connection channel
    pub delivered: usize,
    /// Envelopes lost to a full or closed channel
    pub dropped: usize,
}

impl SubscriptionRegistry {
    /// Deliver `event` to every matching subscription
    ///
    /// Each delivery is `["EVENT", <subscription id>, <event>]`. Call once per
    /// accepted event.
    pub async fn notify(&self, event: impl Into<Arc<Event>>) -> DeliveryReport {
        let event = event.into();
        let mut report = DeliveryReport::default();

        let connections = self.connections.lock().await;

        for (connection, entry) in connections.iter() {
            for subscription in entry.subscriptions.values() {
                if !subscription.filters.matches(&event) {
                    continue;
                }
                report.matched += 1;

                let message = RelayMessage::event(subscription.id.clone(), Arc::clone(&event));
                match entry.handle.try_send(message) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        report.dropped += 1;
                        tracing::warn!(
                            connection = %connection,
                            subscription = %subscription.id,
                            event = %event.id,
                            "Delivery dropped: channel full"
                        );
                    }
                    Err(TrySendError::Closed(_)) => {
                        report.dropped += 1;
                        tracing::debug!(
                            connection = %connection,
                            subscription = %subscription.id,
                            event = %event.id,
                            "Delivery dropped: connection closed"
                        );
                    }
                }
            }
        }

        tracing::trace!(
            event = %event.id,
            kind = event.kind,
            matched = report.matched,
            delivered = report.delivered,
            dropped = report.dropped,
            "Event fanned out"
        );

        report
    }
}
