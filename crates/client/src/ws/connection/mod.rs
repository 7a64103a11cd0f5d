//! Connection state machine, reconnect policy and the outbound handle.
//!
//! The connection itself is driven by the supervisor task in
//! [`supervisor`]; everything here is plain data so the lifecycle can be
//! exercised without a network.

use std::time::Duration;

use livesync_shared::{InboundEvent, OutboundEvent, OutboundFrame, TransportError, WsEnvelope};
use tokio::sync::mpsc::UnboundedSender;

use super::transport::TransportKind;

pub(crate) mod supervisor;

/// Connection state for the realtime channel
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Failed { reason: String },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. }
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ConnectionState::Failed { .. })
    }

    /// Next state after a transport lifecycle event.
    ///
    /// Inbound data events leave the state untouched.
    pub fn transition(&self, event: &TransportEvent) -> ConnectionState {
        match event {
            TransportEvent::Connected { .. } => ConnectionState::Connected,
            TransportEvent::Disconnected { .. } | TransportEvent::ConnectError { .. } => {
                ConnectionState::Disconnected
            }
            TransportEvent::Reconnecting { attempt } => ConnectionState::Reconnecting {
                attempt: *attempt,
            },
            TransportEvent::Failed { reason } => ConnectionState::Failed {
                reason: reason.clone(),
            },
            TransportEvent::Inbound(_) => self.clone(),
        }
    }
}

/// Configuration for auto-reconnect behavior
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Whether to reconnect at all after a failed attempt or a lost link
    pub enabled: bool,
    /// Maximum number of consecutive failed attempts (0 = infinite)
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    pub delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            delay_ms: 1000,
        }
    }
}

impl ReconnectConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Whether another attempt is allowed after `failures` consecutive failures.
    pub fn should_retry(&self, failures: u32) -> bool {
        self.enabled && (self.max_attempts == 0 || failures < self.max_attempts)
    }
}

/// Lifecycle and data events surfaced by the supervisor, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected { transport: TransportKind },
    Disconnected { reason: String },
    ConnectError { attempt: u32, error: TransportError },
    Reconnecting { attempt: u32 },
    Failed { reason: String },
    Inbound(InboundEvent),
}

/// Handle for sending commands through the active channel
#[derive(Clone)]
pub struct WsHandle {
    sender: UnboundedSender<OutboundFrame>,
    pub endpoint: String,
}

impl WsHandle {
    pub(crate) fn new(sender: UnboundedSender<OutboundFrame>, endpoint: String) -> Self {
        Self { sender, endpoint }
    }

    /// Queue a command for the server
    pub fn send(&self, cmd: OutboundEvent) -> Result<(), TransportError> {
        tracing::debug!("WsHandle::send to '{}': {:?}", self.endpoint, cmd);
        self.sender
            .send(WsEnvelope::new(cmd))
            .map_err(|e| TransportError::Closed(format!("failed to send: {}", e)))
    }

    /// Subscribe to a conversation
    pub fn join(&self, conversation_id: &str) -> Result<(), TransportError> {
        self.send(OutboundEvent::JoinConversation(conversation_id.to_string()))
    }

    /// Unsubscribe from a conversation
    pub fn leave(&self, conversation_id: &str) -> Result<(), TransportError> {
        self.send(OutboundEvent::LeaveConversation(conversation_id.to_string()))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn lifecycle_transitions() {
        let idle = ConnectionState::Connecting;

        let up = idle.transition(&TransportEvent::Connected {
            transport: TransportKind::WebSocket,
        });
        assert!(up.is_connected());

        let down = up.transition(&TransportEvent::Disconnected {
            reason: "closed".to_string(),
        });
        assert_eq!(down, ConnectionState::Disconnected);

        let retry = down.transition(&TransportEvent::Reconnecting { attempt: 2 });
        assert!(retry.is_connecting());

        let err = retry.transition(&TransportEvent::ConnectError {
            attempt: 2,
            error: TransportError::Network("refused".to_string()),
        });
        assert!(!err.is_connected());

        let failed = err.transition(&TransportEvent::Failed {
            reason: "gave up".to_string(),
        });
        assert!(failed.is_failed());
    }

    #[test]
    fn inbound_events_keep_state() {
        let state = ConnectionState::Connected;
        let next = state.transition(&TransportEvent::Inbound(InboundEvent::UserOnline(
            "u1".to_string(),
        )));
        assert_eq!(next, ConnectionState::Connected);
    }

    #[test]
    fn bounded_retry_policy() {
        let config = ReconnectConfig {
            enabled: true,
            max_attempts: 5,
            delay_ms: 1000,
        };
        assert!(config.should_retry(4));
        assert!(!config.should_retry(5));
        assert_eq!(config.delay(), Duration::from_secs(1));
    }

    #[test]
    fn zero_max_attempts_retries_forever() {
        let config = ReconnectConfig {
            max_attempts: 0,
            ..ReconnectConfig::default()
        };
        assert!(config.should_retry(10_000));
    }

    #[test]
    fn disabled_reconnect_never_retries() {
        let config = ReconnectConfig {
            enabled: false,
            ..ReconnectConfig::default()
        };
        assert!(!config.should_retry(0));
    }

    #[test]
    fn handle_wraps_commands_in_envelopes() {
        let (tx, mut rx) = unbounded_channel();
        let handle = WsHandle::new(tx, "ws://localhost:5000/ws".to_string());

        handle.join("c1").unwrap();
        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.payload, OutboundEvent::JoinConversation("c1".to_string()));
        assert!(!frame.id.is_empty());

        drop(rx);
        assert!(handle.is_closed());
        assert!(handle.leave("c1").is_err());
    }
}
