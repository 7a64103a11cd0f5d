//! HTTP long-poll fallback transport.
//!
//! `GET {base}/poll?cursor=N` blocks until events after `cursor` are
//! available and returns a [`PollBatch`]; outbound frames are `POST`ed to
//! the same URL. The first request doubles as the handshake.

use async_trait::async_trait;
use livesync_shared::{InboundEvent, InboundFrame, OutboundFrame, PollBatch, TransportError};
use reqwest::{Client, StatusCode};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use url::Url;

use super::{ConnectRequest, Connector, Link, TransportKind};

#[derive(Debug, Clone, Default)]
pub struct PollingConnector {
    client: Client,
}

impl PollingConnector {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, TLS roots)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Connector for PollingConnector {
    fn kind(&self) -> TransportKind {
        TransportKind::Polling
    }

    async fn open(&self, request: &ConnectRequest) -> Result<Link, TransportError> {
        let url = request.polling_url()?;
        let auth = request.authorization();

        let first = poll(&self.client, &url, &auth, None).await?;
        tracing::info!("Long-poll channel established at {}", url);

        let (link, peer) = Link::pair();
        forward_batch(&peer.inbound, first.events, &url);

        tokio::spawn(run_poller(
            self.client.clone(),
            url.clone(),
            auth.clone(),
            first.cursor,
            peer.inbound,
        ));
        tokio::spawn(run_poster(self.client.clone(), url, auth, peer.outbound));
        Ok(link)
    }
}

async fn poll(
    client: &Client,
    url: &Url,
    auth: &str,
    cursor: Option<u64>,
) -> Result<PollBatch, TransportError> {
    let mut rb = client.get(url.clone()).header(reqwest::header::AUTHORIZATION, auth);
    if let Some(cursor) = cursor {
        rb = rb.query(&[("cursor", cursor)]);
    }

    let resp = rb
        .send()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;
    let status = resp.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(PollBatch {
            cursor: cursor.unwrap_or_default(),
            events: Vec::new(),
        });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(TransportError::Http {
            status: status.as_u16(),
            body,
        });
    }

    resp.json::<PollBatch>()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))
}

/// Returns false once the link has been dropped.
fn forward_batch(
    inbound: &UnboundedSender<InboundEvent>,
    events: Vec<serde_json::Value>,
    url: &Url,
) -> bool {
    for raw in events {
        match serde_json::from_value::<InboundFrame>(raw) {
            Ok(frame) => {
                if inbound.send(frame.payload).is_err() {
                    return false;
                }
            }
            Err(e) => tracing::warn!("Dropping malformed frame from {}: {}", url, e),
        }
    }
    true
}

async fn run_poller(
    client: Client,
    url: Url,
    auth: String,
    mut cursor: u64,
    inbound: UnboundedSender<InboundEvent>,
) {
    loop {
        let batch = tokio::select! {
            _ = inbound.closed() => break,
            batch = poll(&client, &url, &auth, Some(cursor)) => batch,
        };

        match batch {
            Ok(batch) => {
                cursor = batch.cursor;
                if !forward_batch(&inbound, batch.events, &url) {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Long-poll to {} failed: {}", url, e);
                break;
            }
        }
    }
    tracing::info!("Long-poll channel to {} closed", url);
}

async fn run_poster(
    client: Client,
    url: Url,
    auth: String,
    mut outbound: UnboundedReceiver<OutboundFrame>,
) {
    while let Some(cmd) = outbound.recv().await {
        let result = client
            .post(url.clone())
            .header(reqwest::header::AUTHORIZATION, auth.as_str())
            .json(&cmd)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => tracing::warn!("POST to {} rejected: HTTP {}", url, resp.status()),
            Err(e) => {
                tracing::error!("POST to {} failed: {}", url, e);
                break;
            }
        }
    }
}
