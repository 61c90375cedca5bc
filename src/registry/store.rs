//! Subscription registry implementation
//!
//! The central registry that tracks which connections hold which
//! subscriptions. Fan-out and introspection live in sibling modules and share
//! the same lock.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::filter::Filters;

use super::config::RegistryConfig;
use super::connection::{ConnectionHandle, ConnectionId};
use super::entry::{ConnectionEntry, Subscription};
use super::error::RegistryError;

/// Central registry for all live subscriptions
///
/// One exclusive lock covers the whole map. Create one per relay and share
/// it as `Arc<SubscriptionRegistry>`.
pub struct SubscriptionRegistry {
    /// Map of connection id to that connection's subscriptions
    pub(super) connections: Mutex<HashMap<ConnectionId, ConnectionEntry>>,

    /// Configuration
    config: RegistryConfig,
}

impl SubscriptionRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create or replace the subscription `id` on `connection`
    ///
    /// Never enforces the limit: callers that want it enforced should use
    /// [`try_subscribe`](Self::try_subscribe) instead. A closed connection is
    /// skipped, since nothing would remove its entry again.
    pub async fn subscribe(
        &self,
        connection: &ConnectionHandle,
        id: impl Into<String>,
        filters: impl Into<Filters>,
    ) {
        let id = id.into();
        let mut connections = self.connections.lock().await;

        if connection.is_closed() {
            tracing::debug!(
                connection = %connection.id(),
                subscription = %id,
                "Subscription skipped: connection closed"
            );
            return;
        }

        insert(&mut connections, connection, id, filters.into());
    }

    /// Create or replace the subscription `id`, enforcing the limit
    ///
    /// Replacing an existing id is always allowed. The check and the insert
    /// happen under one lock acquisition. Uses the same count as
    /// [`subscription_limit_reached`](Self::subscription_limit_reached).
    pub async fn try_subscribe(
        &self,
        connection: &ConnectionHandle,
        id: impl Into<String>,
        filters: impl Into<Filters>,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        let limit = self.config.max_subscriptions_per_connection;
        let mut connections = self.connections.lock().await;

        if connection.is_closed() {
            tracing::debug!(
                connection = %connection.id(),
                subscription = %id,
                "Subscription rejected: connection closed"
            );
            return Err(RegistryError::ConnectionClosed(connection.id()));
        }

        let entry = connections.get(&connection.id());
        let replacing = entry.is_some_and(|e| e.subscriptions.contains_key(&id));
        let count = entry.map_or(0, |e| e.subscription_count());

        if !replacing && count >= limit {
            tracing::debug!(
                connection = %connection.id(),
                subscription = %id,
                limit = limit,
                "Subscription rejected: limit reached"
            );
            return Err(RegistryError::SubscriptionLimitReached {
                connection: connection.id(),
                limit,
            });
        }

        insert(&mut connections, connection, id, filters.into());
        Ok(())
    }

    /// Check whether `connection` already holds the maximum subscriptions
    pub async fn subscription_limit_reached(&self, connection: ConnectionId) -> bool {
        let connections = self.connections.lock().await;

        connections.get(&connection).map_or(0, |e| e.subscription_count())
            >= self.config.max_subscriptions_per_connection
    }

    /// Remove a single subscription
    ///
    /// The connection entry goes away with its last subscription.
    pub async fn unsubscribe(&self, connection: ConnectionId, id: &str) {
        let mut connections = self.connections.lock().await;

        let Some(entry) = connections.get_mut(&connection) else {
            return;
        };

        if entry.subscriptions.remove(id).is_some() {
            tracing::debug!(
                connection = %connection,
                subscription = %id,
                remaining = entry.subscription_count(),
                "Subscription removed"
            );
        }

        if entry.subscriptions.is_empty() {
            connections.remove(&connection);
        }
    }

    /// Remove a connection and all of its subscriptions
    pub async fn drop_connection(&self, connection: ConnectionId) {
        let mut connections = self.connections.lock().await;

        if let Some(entry) = connections.remove(&connection) {
            tracing::info!(
                connection = %connection,
                address = %entry.handle.meta().address,
                subscriptions = entry.subscription_count(),
                "Connection removed from registry"
            );
        }
    }

    /// Number of connections with at least one subscription
    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }

    /// Number of live subscriptions on `connection`
    pub async fn subscription_count(&self, connection: ConnectionId) -> usize {
        self.connections
            .lock()
            .await
            .get(&connection)
            .map_or(0, |e| e.subscription_count())
    }

    /// Check whether `connection` holds subscription `id`
    pub async fn has_subscription(&self, connection: ConnectionId, id: &str) -> bool {
        self.connections
            .lock()
            .await
            .get(&connection)
            .is_some_and(|e| e.subscriptions.contains_key(id))
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn insert(
    connections: &mut HashMap<ConnectionId, ConnectionEntry>,
    connection: &ConnectionHandle,
    id: String,
    filters: Filters,
) {
    let entry = connections
        .entry(connection.id())
        .or_insert_with(|| ConnectionEntry::new(connection.clone()));

    let before = entry.subscription_count();
    let filter_count = filters.len();
    let replaced = entry
        .subscriptions
        .insert(id.clone(), Subscription::new(id.clone(), filters))
        .is_some();

    tracing::debug!(
        connection = %connection.id(),
        address = %connection.meta().address,
        subscription = %id,
        filters = filter_count,
        replaced = replaced,
        before = before,
        after = entry.subscription_count(),
        "Subscription set"
    );
}
