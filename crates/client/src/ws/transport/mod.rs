//! Transports that can carry the realtime channel.
//!
//! A [`Connector`] performs the handshake for one transport kind and hands
//! back a [`Link`]: a pair of channels that stay open for as long as the
//! underlying connection does. The supervisor tries connectors in the
//! configured preference order.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use livesync_shared::{ConfigError, InboundEvent, OutboundFrame, TransportError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use url::Url;

mod polling;
mod websocket;

pub use polling::PollingConnector;
pub use websocket::WebSocketConnector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    WebSocket,
    Polling,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::WebSocket => write!(f, "websocket"),
            TransportKind::Polling => write!(f, "polling"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "websocket" | "ws" => Ok(TransportKind::WebSocket),
            "polling" | "long-polling" => Ok(TransportKind::Polling),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

/// Everything a connector needs for one attempt. Built fresh per attempt
/// so a rotated token is picked up on reconnect.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub endpoint: String,
    pub user_id: String,
    pub token: String,
}

impl ConnectRequest {
    /// Value of the `Authorization` header sent with the handshake.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Endpoint rewritten to a `ws(s)://.../ws` URL.
    pub fn websocket_url(&self) -> Result<Url, TransportError> {
        self.url_for("ws", |scheme| match scheme {
            "http" | "ws" => Some("ws"),
            "https" | "wss" => Some("wss"),
            _ => None,
        })
    }

    /// Endpoint rewritten to an `http(s)://.../poll` URL.
    pub fn polling_url(&self) -> Result<Url, TransportError> {
        self.url_for("poll", |scheme| match scheme {
            "http" | "ws" => Some("http"),
            "https" | "wss" => Some("https"),
            _ => None,
        })
    }

    fn url_for(
        &self,
        segment: &str,
        scheme_for: impl Fn(&str) -> Option<&'static str>,
    ) -> Result<Url, TransportError> {
        let invalid = |reason: &str| TransportError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: reason.to_string(),
        };

        let mut url = Url::parse(&self.endpoint).map_err(|e| invalid(&e.to_string()))?;
        let scheme = scheme_for(url.scheme()).ok_or_else(|| invalid("unsupported scheme"))?;
        url.set_scheme(scheme)
            .map_err(|_| invalid("unsupported scheme"))?;
        url.path_segments_mut()
            .map_err(|_| invalid("endpoint cannot have a path"))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }
}

/// The client side of an open connection.
///
/// Dropping `outbound` asks the transport to shut down; `inbound` ending
/// means the connection is gone.
pub struct Link {
    pub outbound: UnboundedSender<OutboundFrame>,
    pub inbound: UnboundedReceiver<InboundEvent>,
}

/// The transport side of a [`Link`].
pub struct LinkPeer {
    pub inbound: UnboundedSender<InboundEvent>,
    pub outbound: UnboundedReceiver<OutboundFrame>,
}

impl Link {
    pub fn pair() -> (Link, LinkPeer) {
        let (outbound_tx, outbound_rx) = unbounded_channel();
        let (inbound_tx, inbound_rx) = unbounded_channel();
        (
            Link {
                outbound: outbound_tx,
                inbound: inbound_rx,
            },
            LinkPeer {
                inbound: inbound_tx,
                outbound: outbound_rx,
            },
        )
    }
}

#[async_trait]
pub trait Connector: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// Perform the handshake and return a live link.
    async fn open(&self, request: &ConnectRequest) -> Result<Link, TransportError>;
}

/// Default connector for a transport kind.
pub fn connector_for(kind: TransportKind) -> Arc<dyn Connector> {
    match kind {
        TransportKind::WebSocket => Arc::new(WebSocketConnector::new()),
        TransportKind::Polling => Arc::new(PollingConnector::new()),
    }
}
