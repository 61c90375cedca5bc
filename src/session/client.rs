//! Per-connection session
//!
//! Binds one connection handle to the shared registry. The transport keeps
//! the receiver returned by [`ClientSession::open`], writes whatever arrives
//! on it, and calls [`ClientSession::close`] when the socket goes away.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::filter::Filters;
use crate::message::RelayMessage;
use crate::registry::{
    ConnectionHandle, ConnectionId, ConnectionMeta, RegistryError, SubscriptionRegistry,
};

/// Reason sent in `CLOSED` when a connection is over its subscription limit
pub const LIMIT_REACHED_REASON: &str = "error: too many concurrent subscriptions";

/// Session context for one client connection
#[derive(Clone)]
pub struct ClientSession {
    handle: ConnectionHandle,
    registry: Arc<SubscriptionRegistry>,
}

impl ClientSession {
    /// Open a session for a newly accepted connection
    ///
    /// Returns the session and the receiver of outbound messages.
    pub fn open(
        registry: Arc<SubscriptionRegistry>,
        meta: ConnectionMeta,
    ) -> (Self, mpsc::Receiver<RelayMessage>) {
        let (handle, rx) = ConnectionHandle::channel(meta, registry.config().channel_capacity);

        tracing::info!(
            connection = %handle.id(),
            address = %handle.meta().address,
            origin = %handle.meta().origin,
            "Client session opened"
        );

        (Self { handle, registry }, rx)
    }

    /// Session's connection id
    pub fn id(&self) -> ConnectionId {
        self.handle.id()
    }

    /// Request metadata
    pub fn meta(&self) -> &ConnectionMeta {
        self.handle.meta()
    }

    /// Handle a `REQ`: install or replace a subscription
    ///
    /// Over the limit, the client is told with a `CLOSED` message and the
    /// registry error is returned.
    pub async fn subscribe(&self, id: &str, filters: impl Into<Filters>) -> Result<()> {
        match self.registry.try_subscribe(&self.handle, id, filters).await {
            Ok(()) => Ok(()),
            Err(e @ RegistryError::SubscriptionLimitReached { .. }) => {
                tracing::warn!(
                    connection = %self.handle.id(),
                    address = %self.handle.meta().address,
                    subscription = %id,
                    "Subscription refused: limit reached"
                );
                // Best effort, same as event delivery
                let _ = self
                    .handle
                    .try_send(RelayMessage::closed(id, LIMIT_REACHED_REASON));
                Err(e.into())
            }
            Err(e @ RegistryError::ConnectionClosed(_)) => Err(e.into()),
        }
    }

    /// Handle a `CLOSE`: drop one subscription
    pub async fn unsubscribe(&self, id: &str) {
        self.registry.unsubscribe(self.handle.id(), id).await;
    }

    /// Queue a `NOTICE` for the client
    pub fn notice(&self, text: impl Into<String>) {
        let _ = self.handle.try_send(RelayMessage::Notice(text.into()));
    }

    /// Tear the session down after the connection closed
    ///
    /// Clones of this session share the closed state, so a late `REQ` on any
    /// of them is refused instead of bringing the connection back.
    pub async fn close(self) {
        self.handle.close();
        self.registry.drop_connection(self.handle.id()).await;
        tracing::info!(connection = %self.handle.id(), "Client session closed");
    }
}
