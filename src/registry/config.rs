//! Registry configuration

/// Default cap on live subscriptions per connection
pub const DEFAULT_MAX_SUBSCRIPTIONS: usize = 8;

/// Default capacity of a connection's outbound channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Registry configuration options
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Live subscriptions a single connection may hold
    pub max_subscriptions_per_connection: usize,

    /// Outbound messages buffered per connection before deliveries are dropped
    pub channel_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_subscriptions_per_connection: DEFAULT_MAX_SUBSCRIPTIONS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Set the per-connection subscription limit
    pub fn max_subscriptions_per_connection(mut self, max: usize) -> Self {
        self.max_subscriptions_per_connection = max;
        self
    }

    /// Set the outbound channel capacity (at least 1)
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.max_subscriptions_per_connection, 8);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RegistryConfig::default()
            .max_subscriptions_per_connection(20)
            .channel_capacity(16);

        assert_eq!(config.max_subscriptions_per_connection, 20);
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn test_builder_channel_capacity_floor() {
        // tokio's mpsc panics on a zero capacity
        let config = RegistryConfig::default().channel_capacity(0);

        assert_eq!(config.channel_capacity, 1);
    }
}
