//! Crate-level error type

use crate::registry::RegistryError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Debug)]
pub enum Error {
    /// Registry rejected the operation
    Registry(RegistryError),
    /// JSON encoding or decoding failed
    Json(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Registry(e) => Some(e),
            Error::Json(e) => Some(e),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConnectionId;

    #[test]
    fn test_registry_error_display() {
        let err: Error = RegistryError::SubscriptionLimitReached {
            connection: ConnectionId::new(3),
            limit: 8,
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Registry error: Subscription limit reached for conn-3 (max 8)"
        );
    }

    #[test]
    fn test_json_error_source() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = Error::from(json_err);

        assert!(matches!(err, Error::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
