//! Registry introspection for operational endpoints

use std::collections::HashSet;

use crate::filter::Filter;

use super::entry::ConnectionStats;
use super::store::SubscriptionRegistry;

impl SubscriptionRegistry {
    /// Every distinct filter currently registered
    ///
    /// Filters are deduplicated by value across all connections and
    /// subscriptions and returned in first-seen order.
    pub async fn active_filters(&self) -> Vec<Filter> {
        let connections = self.connections.lock().await;

        let mut seen: HashSet<&Filter> = HashSet::new();
        let mut filters = Vec::new();

        for entry in connections.values() {
            for subscription in entry.subscriptions.values() {
                for filter in &subscription.filters {
                    if seen.insert(filter) {
                        filters.push(filter.clone());
                    }
                }
            }
        }

        filters
    }

    /// Per-connection statistics, one entry per live connection
    pub async fn stats(&self) -> Vec<ConnectionStats> {
        let connections = self.connections.lock().await;
        connections.values().map(|entry| entry.stats()).collect()
    }
}
