//! Per-connection registry entries
//!
//! This module defines the state stored in the registry for each connection.

use std::collections::HashMap;

use serde::Serialize;

use crate::filter::Filters;

use super::connection::{ConnectionHandle, ConnectionId};

/// One named filter set owned by a connection
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Client-chosen id, unique within its connection
    pub id: String,
    /// Filters as sent by the client, duplicates included
    pub filters: Filters,
}

impl Subscription {
    pub fn new(id: String, filters: Filters) -> Self {
        Self { id, filters }
    }
}

/// Entry for a single connection in the registry
///
/// Only exists while the connection has at least one subscription.
#[derive(Debug)]
pub struct ConnectionEntry {
    /// Delivery handle
    pub handle: ConnectionHandle,

    /// Live subscriptions keyed by id
    pub subscriptions: HashMap<String, Subscription>,
}

impl ConnectionEntry {
    pub(super) fn new(handle: ConnectionHandle) -> Self {
        Self {
            handle,
            subscriptions: HashMap::new(),
        }
    }

    /// Get the number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Snapshot this entry for diagnostics
    pub fn stats(&self) -> ConnectionStats {
        let meta = self.handle.meta();
        ConnectionStats {
            connection: self.handle.id(),
            address: meta.address.clone(),
            origin: meta.origin.clone(),
            subscription_count: self.subscription_count(),
        }
    }
}

/// Statistics for a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStats {
    /// Connection id
    pub connection: ConnectionId,
    /// Client address
    pub address: String,
    /// Origin header
    pub origin: String,
    /// Number of live subscriptions
    pub subscription_count: usize,
}
