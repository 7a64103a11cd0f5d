//! Realtime channel to the sync server.
//!
//! This module provides:
//! - A connection supervisor with bounded, fixed-delay reconnect
//! - Transport fallback (WebSocket first, HTTP long-poll second by default)
//! - The [`ConnectionState`] machine that gates outbound actions
//!
//! # Architecture
//!
//! ```text
//!   ┌──────────────┐  commands   ┌────────────┐   frames   ┌───────────┐
//!   │ SyncSession  │────────────▶│ Supervisor │◀──────────▶│ Connector │
//!   │ (owns store) │◀────────────│  (task)    │            │  (ws/poll)│
//!   └──────────────┘  events     └────────────┘            └───────────┘
//! ```
//!
//! The supervisor never touches local state. It forwards lifecycle and
//! inbound events over a channel; the session drains that channel on the
//! caller's task and applies each event in order.

mod connection;
mod transport;

pub use connection::{ConnectionState, ReconnectConfig, TransportEvent, WsHandle};
pub(crate) use connection::supervisor::Supervisor;

pub use transport::{
    connector_for, ConnectRequest, Connector, Link, LinkPeer, PollingConnector, TransportKind,
    WebSocketConnector,
};
