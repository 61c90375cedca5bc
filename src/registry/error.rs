//! Registry error types

use super::connection::ConnectionId;

/// Error type for registry operations
///
/// Removal of unknown connections or subscriptions is never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Connection already holds the maximum number of subscriptions
    SubscriptionLimitReached {
        connection: ConnectionId,
        limit: usize,
    },
    /// Connection was already closed
    ConnectionClosed(ConnectionId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::SubscriptionLimitReached { connection, limit } => {
                write!(
                    f,
                    "Subscription limit reached for {} (max {})",
                    connection, limit
                )
            }
            RegistryError::ConnectionClosed(connection) => {
                write!(f, "Connection closed: {}", connection)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
