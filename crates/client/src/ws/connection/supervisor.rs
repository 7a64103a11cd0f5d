//! Connection supervisor: connect, pump, reconnect with a fixed delay.

use std::sync::Arc;

use livesync_shared::{OutboundFrame, TransportError};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use super::{ReconnectConfig, TransportEvent};
use crate::credentials::CredentialSupplier;
use crate::ws::transport::{ConnectRequest, Connector, Link, TransportKind};

/// How a live link ended.
enum LinkEnd {
    /// The owning session went away; stop without reconnecting.
    SessionClosed,
    /// The connection dropped underneath us.
    Lost(String),
}

pub(crate) struct Supervisor {
    pub endpoint: String,
    pub reconnect: ReconnectConfig,
    pub connectors: Vec<Arc<dyn Connector>>,
    pub credentials: Arc<dyn CredentialSupplier>,
    pub events: UnboundedSender<TransportEvent>,
    pub commands: UnboundedReceiver<OutboundFrame>,
}

impl Supervisor {
    /// Run until reconnect attempts run out or the session is closed.
    pub async fn run(mut self) {
        let mut attempt = 0u32;
        let mut failures = 0u32;

        loop {
            if attempt > 0 {
                if !self.emit(TransportEvent::Reconnecting { attempt }) {
                    return;
                }
                tracing::info!(
                    "Reconnecting to {} in {}ms (attempt {})",
                    self.endpoint,
                    self.reconnect.delay_ms,
                    attempt
                );
                tokio::time::sleep(self.reconnect.delay()).await;
            }

            match self.open().await {
                Ok((transport, link)) => {
                    failures = 0;
                    // Commands issued while we were down are dropped, not replayed
                    while self.commands.try_recv().is_ok() {}

                    if !self.emit(TransportEvent::Connected { transport }) {
                        return;
                    }

                    match self.pump(link).await {
                        LinkEnd::SessionClosed => return,
                        LinkEnd::Lost(reason) => {
                            tracing::info!("Connection to {} lost: {}", self.endpoint, reason);
                            if !self.emit(TransportEvent::Disconnected { reason }) {
                                return;
                            }
                            if !self.reconnect.enabled {
                                return;
                            }
                            attempt = 1;
                        }
                    }
                }
                Err(error) => {
                    failures += 1;
                    tracing::warn!(
                        "Connection to {} failed (attempt {}): {}",
                        self.endpoint,
                        failures,
                        error
                    );
                    let reason = error.to_string();
                    if !self.emit(TransportEvent::ConnectError {
                        attempt: failures,
                        error,
                    }) {
                        return;
                    }

                    if !self.reconnect.should_retry(failures) {
                        tracing::error!(
                            "Giving up on {} after {} failed attempts",
                            self.endpoint,
                            failures
                        );
                        self.emit(TransportEvent::Failed {
                            reason: format!(
                                "max reconnect attempts ({}) exceeded: {}",
                                failures, reason
                            ),
                        });
                        return;
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Returns false once the session has dropped its receiver.
    fn emit(&self, event: TransportEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Build a request from freshly read credentials.
    fn request(&self) -> Result<ConnectRequest, TransportError> {
        let (user_id, token) = self
            .credentials
            .credentials()
            .ok_or(TransportError::MissingCredentials)?;

        Ok(ConnectRequest {
            endpoint: self.endpoint.clone(),
            user_id,
            token,
        })
    }

    /// Try each connector in preference order; the first success wins.
    async fn open(&self) -> Result<(TransportKind, Link), TransportError> {
        let request = self.request()?;
        let mut last_error = TransportError::NoTransports;

        for connector in &self.connectors {
            match connector.open(&request).await {
                Ok(link) => return Ok((connector.kind(), link)),
                Err(e) => {
                    tracing::debug!("{} transport unavailable: {}", connector.kind(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Shuttle frames between the session and the link.
    async fn pump(&mut self, mut link: Link) -> LinkEnd {
        loop {
            tokio::select! {
                inbound = link.inbound.recv() => match inbound {
                    Some(event) => {
                        if !self.emit(TransportEvent::Inbound(event)) {
                            return LinkEnd::SessionClosed;
                        }
                    }
                    None => return LinkEnd::Lost("transport closed".to_string()),
                },
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => {
                        if link.outbound.send(cmd).is_err() {
                            return LinkEnd::Lost("transport stopped accepting frames".to_string());
                        }
                    }
                    None => return LinkEnd::SessionClosed,
                },
            }
        }
    }
}
