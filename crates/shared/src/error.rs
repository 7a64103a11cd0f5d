//! Error types shared across the livesync crates.

use thiserror::Error;

/// Failure to establish or keep a realtime channel.
///
/// These never escape the public action API; they are logged and folded
/// into the connection state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("no credentials available")]
    MissingCredentials,

    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("no transports configured")]
    NoTransports,

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("channel closed: {0}")]
    Closed(String),
}

/// Malformed configuration value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("unknown transport {0:?}")]
    UnknownTransport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TransportError::Http {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: busy");
    }
}
