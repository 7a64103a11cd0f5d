//! WebSocket transport using tokio-tungstenite.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use livesync_shared::{decode_inbound, TransportError};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{ConnectRequest, Connector, Link, LinkPeer, TransportKind};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Primary transport: one WebSocket per link.
#[derive(Debug, Clone, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    fn kind(&self) -> TransportKind {
        TransportKind::WebSocket
    }

    async fn open(&self, request: &ConnectRequest) -> Result<Link, TransportError> {
        let url = request.websocket_url()?;

        let mut ws_request = url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::Handshake(e.to_string()))?;
        let auth = HeaderValue::from_str(&request.authorization())
            .map_err(|e| TransportError::Handshake(format!("invalid token: {}", e)))?;
        ws_request.headers_mut().insert(AUTHORIZATION, auth);

        let (socket, _response) = connect_async(ws_request)
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;
        tracing::info!("WebSocket connected to {}", url);

        let (link, peer) = Link::pair();
        tokio::spawn(run_socket(socket, peer, url.to_string()));
        Ok(link)
    }
}

/// Pump frames between the socket and the link until either side goes away.
async fn run_socket(socket: Socket, mut peer: LinkPeer, url: String) {
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            msg_result = read.next() => match msg_result {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!("WebSocket received: {}", text.as_str());
                    match decode_inbound(text.as_str()) {
                        Ok(frame) => {
                            if peer.inbound.send(frame.payload).is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("Dropping malformed frame from {}: {}", url, e),
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    tracing::info!("WebSocket to {} received close frame", url);
                    break;
                }
                Some(Ok(_)) => {
                    // Ping/pong is handled by tungstenite; binary frames are not part of the protocol
                }
                Some(Err(e)) => {
                    tracing::error!("WebSocket read error from {}: {}", url, e);
                    break;
                }
                None => break,
            },
            cmd = peer.outbound.recv() => match cmd {
                Some(cmd) => match serde_json::to_string(&cmd) {
                    Ok(json) => {
                        tracing::debug!("Sending to {}: {}", url, json);
                        if let Err(e) = write.send(Message::text(json)).await {
                            tracing::error!("Send to {} failed: {}", url, e);
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Serialize failed: {}", e),
                },
                None => {
                    tracing::debug!("Link dropped, closing WebSocket to {}", url);
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
        }
    }

    tracing::info!("WebSocket to {} closed", url);
}
