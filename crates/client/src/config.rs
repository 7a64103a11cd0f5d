//! Session configuration from environment variables.

use livesync_shared::ConfigError;

use crate::ws::{ReconnectConfig, TransportKind};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Server base URL; `http(s)` and `ws(s)` are both accepted
    pub endpoint: String,
    /// Transports to try, most preferred first
    pub transports: Vec<TransportKind>,
    pub reconnect: ReconnectConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transports: vec![TransportKind::WebSocket, TransportKind::Polling],
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Parse configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LIVESYNC_SERVER_URL`: server base URL (default: "http://localhost:5000")
    /// - `LIVESYNC_TRANSPORTS`: comma-separated preference list (default: "websocket,polling")
    /// - `LIVESYNC_RECONNECT`: "true" | "false" (default: "true")
    /// - `LIVESYNC_RECONNECT_ATTEMPTS`: max consecutive failures, 0 = unbounded (default: 5)
    /// - `LIVESYNC_RECONNECT_DELAY_MS`: fixed delay between attempts (default: 1000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("LIVESYNC_SERVER_URL").filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }

        if let Some(list) = lookup("LIVESYNC_TRANSPORTS") {
            let transports = list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<TransportKind>())
                .collect::<Result<Vec<TransportKind>, _>>()?;
            if !transports.is_empty() {
                config.transports = transports;
            }
        }

        if let Some(value) = lookup("LIVESYNC_RECONNECT") {
            config.reconnect.enabled = parse_bool("LIVESYNC_RECONNECT", &value)?;
        }
        if let Some(value) = lookup("LIVESYNC_RECONNECT_ATTEMPTS") {
            config.reconnect.max_attempts = parse_num("LIVESYNC_RECONNECT_ATTEMPTS", &value)?;
        }
        if let Some(value) = lookup("LIVESYNC_RECONNECT_DELAY_MS") {
            config.reconnect.delay_ms = parse_num("LIVESYNC_RECONNECT_DELAY_MS", &value)?;
        }

        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_transports(mut self, transports: Vec<TransportKind>) -> Self {
        self.transports = transports;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<SyncConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SyncConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect.delay_ms, 1000);
        assert_eq!(
            config.transports,
            [TransportKind::WebSocket, TransportKind::Polling]
        );
    }

    #[test]
    fn blank_endpoint_falls_back_to_default() {
        let config = from_vars(&[("LIVESYNC_SERVER_URL", "  ")]).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn reads_overrides() {
        let config = from_vars(&[
            ("LIVESYNC_SERVER_URL", "https://chat.example.com"),
            ("LIVESYNC_TRANSPORTS", "polling"),
            ("LIVESYNC_RECONNECT", "off"),
            ("LIVESYNC_RECONNECT_ATTEMPTS", "3"),
            ("LIVESYNC_RECONNECT_DELAY_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.endpoint, "https://chat.example.com");
        assert_eq!(config.transports, [TransportKind::Polling]);
        assert!(!config.reconnect.enabled);
        assert_eq!(config.reconnect.max_attempts, 3);
        assert_eq!(config.reconnect.delay_ms, 250);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            from_vars(&[("LIVESYNC_RECONNECT_ATTEMPTS", "lots")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            from_vars(&[("LIVESYNC_TRANSPORTS", "websocket,smoke-signals")]),
            Err(ConfigError::UnknownTransport(_))
        ));
    }
}
