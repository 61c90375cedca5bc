//! Connection identity and delivery handle

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::message::RelayMessage;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocate the next unused id
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Request metadata captured when the connection was accepted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionMeta {
    /// Client address (forwarded-for header or peer address)
    pub address: String,
    /// `Origin` header of the upgrade request
    pub origin: String,
}

impl ConnectionMeta {
    pub fn new(address: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            origin: origin.into(),
        }
    }
}

/// Handle the registry uses to identify and push to a connection
///
/// Cheap to clone. The transport owns the matching receiver and the
/// connection's lifecycle; the registry only ever sends. Once closed, every
/// clone reports closed and the registry refuses new subscriptions for it.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    meta: Arc<ConnectionMeta>,
    tx: mpsc::Sender<RelayMessage>,
    closed: Arc<AtomicBool>,
}

impl ConnectionHandle {
    /// Create a handle around an existing sender
    pub fn new(id: ConnectionId, meta: ConnectionMeta, tx: mpsc::Sender<RelayMessage>) -> Self {
        Self {
            id,
            meta: Arc::new(meta),
            tx,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a handle with a fresh id and bounded channel
    ///
    /// Returns the handle and the receiver the transport drains.
    pub fn channel(
        meta: ConnectionMeta,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<RelayMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(ConnectionId::next(), meta, tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn meta(&self) -> &ConnectionMeta {
        &self.meta
    }

    /// Whether the connection was closed or the transport dropped its receiver
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.tx.is_closed()
    }

    /// Mark the connection closed for every clone of this handle
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Queue a message without waiting
    ///
    /// Fails immediately when the channel is full or closed.
    pub fn try_send(&self, message: RelayMessage) -> Result<(), TrySendError<RelayMessage>> {
        self.tx.try_send(message)
    }
}
