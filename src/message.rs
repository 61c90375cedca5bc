//! Outbound relay messages
//!
//! Messages the registry and sessions hand to a connection's send channel.
//! The transport writes them as JSON arrays:
//!
//! ```text
//! ["EVENT", <subscription id>, <event>]
//! ["CLOSED", <subscription id>, <reason>]
//! ["NOTICE", <text>]
//! ```

use std::sync::Arc;

use bytes::Bytes;
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::Result;
use crate::event::Event;

/// A message pushed to one client connection
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    /// A live event matched one of the connection's subscriptions
    Event {
        subscription_id: String,
        /// Shared with every other delivery of the same event
        event: Arc<Event>,
    },
    /// The relay ended or refused a subscription
    Closed {
        subscription_id: String,
        reason: String,
    },
    /// Human-readable notice
    Notice(String),
}

impl RelayMessage {
    /// Build an event delivery
    pub fn event(subscription_id: impl Into<String>, event: Arc<Event>) -> Self {
        RelayMessage::Event {
            subscription_id: subscription_id.into(),
            event,
        }
    }

    /// Build a subscription close
    pub fn closed(subscription_id: impl Into<String>, reason: impl Into<String>) -> Self {
        RelayMessage::Closed {
            subscription_id: subscription_id.into(),
            reason: reason.into(),
        }
    }

    /// Message label (first array element)
    pub fn label(&self) -> &'static str {
        match self {
            RelayMessage::Event { .. } => "EVENT",
            RelayMessage::Closed { .. } => "CLOSED",
            RelayMessage::Notice(_) => "NOTICE",
        }
    }

    /// Subscription this message is addressed to, if any
    pub fn subscription_id(&self) -> Option<&str> {
        match self {
            RelayMessage::Event {
                subscription_id, ..
            }
            | RelayMessage::Closed {
                subscription_id, ..
            } => Some(subscription_id),
            RelayMessage::Notice(_) => None,
        }
    }

    /// Encode as a JSON text frame
    pub fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}

impl Serialize for RelayMessage {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RelayMessage::Event {
                subscription_id,
                event,
            } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(self.label())?;
                seq.serialize_element(subscription_id)?;
                seq.serialize_element(event.as_ref())?;
                seq.end()
            }
            RelayMessage::Closed {
                subscription_id,
                reason,
            } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(self.label())?;
                seq.serialize_element(subscription_id)?;
                seq.serialize_element(reason)?;
                seq.end()
            }
            RelayMessage::Notice(text) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(self.label())?;
                seq.serialize_element(text)?;
                seq.end()
            }
        }
    }
}
