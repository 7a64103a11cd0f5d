//! The sync session: one authenticated user, one channel, one store.
//!
//! A [`SyncSession`] is constructed per sign-in and dropped (or
//! [`close`](SyncSession::close)d) on sign-out. Dropping it aborts the
//! connection supervisor, so no channel outlives its session.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut session = SyncSession::new(SyncConfig::from_env()?, credentials);
//! session.connect();
//!
//! while let Some(update) = session.next_update().await {
//!     if let SyncUpdate::Store(changes) = update {
//!         render(session.store(), &changes);
//!     }
//! }
//! ```

use std::sync::Arc;

use livesync_shared::{MessageType, OutboundEvent, ReadReceipt, SendMessage, TransportError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::config::SyncConfig;
use crate::credentials::CredentialSupplier;
use crate::router;
use crate::stores::{StoreChange, SyncStore};
use crate::ws::{
    connector_for, ConnectionState, Connector, Supervisor, TransportEvent, TransportKind, WsHandle,
};

/// What changed after applying one transport event.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncUpdate {
    Connection(ConnectionState),
    /// Empty when the event was a no-op
    Store(Vec<StoreChange>),
}

/// The live supervisor task and both ends of its plumbing.
struct ActiveChannel {
    handle: WsHandle,
    events: UnboundedReceiver<TransportEvent>,
    task: JoinHandle<()>,
}

impl ActiveChannel {
    fn is_live(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ActiveChannel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct SyncSession {
    config: SyncConfig,
    credentials: Arc<dyn CredentialSupplier>,
    connectors: Vec<Arc<dyn Connector>>,
    store: SyncStore,
    state: ConnectionState,
    transport: Option<TransportKind>,
    local_user: Option<String>,
    active: Option<ActiveChannel>,
}

impl SyncSession {
    /// Session using the default connector for each configured transport.
    pub fn new(config: SyncConfig, credentials: impl CredentialSupplier + 'static) -> Self {
        let connectors = config.transports.iter().map(|kind| connector_for(*kind)).collect();
        Self::with_connectors(config, credentials, connectors)
    }

    /// Session with explicit connectors, tried in the order given.
    pub fn with_connectors(
        config: SyncConfig,
        credentials: impl CredentialSupplier + 'static,
        connectors: Vec<Arc<dyn Connector>>,
    ) -> Self {
        Self {
            config,
            credentials: Arc::new(credentials),
            connectors,
            store: SyncStore::new(),
            state: ConnectionState::Disconnected,
            transport: None,
            local_user: None,
            active: None,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Transport carrying the current connection, if connected.
    pub fn transport(&self) -> Option<TransportKind> {
        self.transport.filter(|_| self.is_connected())
    }

    pub fn local_user(&self) -> Option<&str> {
        self.local_user.as_deref()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &SyncStore {
        &self.store
    }

    /// Mutable store access for merging REST-fetched history and seeds.
    pub fn store_mut(&mut self) -> &mut SyncStore {
        &mut self.store
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<StoreChange> {
        self.store.subscribe()
    }

    /// Start the channel.
    ///
    /// No-op while a channel for the same user is already live. A channel
    /// for a different user is torn down first and the store is reset.
    /// Without a user id and token nothing is started, and whatever the
    /// previous user left behind is torn down and cleared.
    pub fn connect(&mut self) {
        let Some((user_id, _token)) = self.credentials.credentials() else {
            tracing::debug!("connect skipped: no signed-in user or token");
            self.sign_out();
            return;
        };

        let same_user = self.local_user.as_deref() == Some(user_id.as_str());
        if let Some(active) = &self.active {
            if active.is_live() && same_user && !self.state.is_failed() {
                tracing::debug!("connect skipped: channel already live");
                return;
            }
        }
        self.close();

        if self.local_user.is_some() && !same_user {
            tracing::info!("Signed-in user changed, resetting local state");
            self.store.reset();
        }

        let (events_tx, events_rx) = unbounded_channel();
        let (commands_tx, commands_rx) = unbounded_channel();
        let supervisor = Supervisor {
            endpoint: self.config.endpoint.clone(),
            reconnect: self.config.reconnect.clone(),
            connectors: self.connectors.clone(),
            credentials: self.credentials.clone(),
            events: events_tx,
            commands: commands_rx,
        };

        tracing::info!("Connecting to {} as {}", self.config.endpoint, user_id);
        self.active = Some(ActiveChannel {
            handle: WsHandle::new(commands_tx, self.config.endpoint.clone()),
            events: events_rx,
            task: tokio::spawn(supervisor.run()),
        });
        self.local_user = Some(user_id);
        self.state = ConnectionState::Connecting;
    }

    /// Drop the channel and everything tied to the signed-out user.
    fn sign_out(&mut self) {
        let Some(user_id) = self.local_user.take() else {
            return;
        };
        tracing::info!("{} signed out, dropping channel and local state", user_id);
        self.close();
        self.store.reset();
    }

    /// Tear the channel down. Local state is kept.
    pub fn close(&mut self) {
        if self.active.take().is_some() {
            tracing::info!("Closing channel to {}", self.config.endpoint);
        }
        self.transport = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Wait for the next transport event and apply it.
    ///
    /// Returns `None` when there is no channel or the supervisor has
    /// stopped (after `Failed`, or a lost link with reconnect disabled).
    pub async fn next_update(&mut self) -> Option<SyncUpdate> {
        let event = self.active.as_mut()?.events.recv().await?;
        Some(self.apply(event))
    }

    /// Apply every event already queued, without waiting.
    pub fn drain_pending(&mut self) -> Vec<SyncUpdate> {
        let mut updates = Vec::new();
        while let Some(event) = self
            .active
            .as_mut()
            .and_then(|active| active.events.try_recv().ok())
        {
            updates.push(self.apply(event));
        }
        updates
    }

    fn apply(&mut self, event: TransportEvent) -> SyncUpdate {
        match event {
            TransportEvent::Inbound(inbound) => {
                tracing::debug!("Routing {}", inbound.name());
                let changes = router::route(&mut self.store, self.local_user.as_deref(), inbound);
                SyncUpdate::Store(changes)
            }
            lifecycle => {
                match &lifecycle {
                    TransportEvent::Connected { transport } => {
                        self.transport = Some(*transport);
                    }
                    TransportEvent::ConnectError { attempt, error } => {
                        tracing::warn!("connect_error (attempt {}): {}", attempt, error);
                    }
                    TransportEvent::Failed { reason } => {
                        tracing::error!("Channel failed: {}", reason);
                    }
                    _ => {}
                }

                let next = self.state.transition(&lifecycle);
                if next != self.state {
                    tracing::info!("Connection state {:?} -> {:?}", self.state, next);
                }
                self.state = next.clone();
                SyncUpdate::Connection(next)
            }
        }
    }

    // --- outbound actions ---

    fn with_channel(
        &self,
        action: &str,
        f: impl FnOnce(&WsHandle) -> Result<(), TransportError>,
    ) {
        let handle = match &self.active {
            Some(active) if self.state.is_connected() => &active.handle,
            _ => {
                tracing::debug!("{} dropped: not connected", action);
                return;
            }
        };

        if let Err(e) = f(handle) {
            tracing::warn!("{} failed: {}", action, e);
        }
    }

    /// Fire-and-forget. The message shows up locally once the server
    /// echoes it back as `new_message`.
    pub fn send_message(&self, conversation_id: &str, content: &str, message_type: MessageType) {
        let Some(sender_id) = self.local_user.clone() else {
            tracing::debug!("send_message dropped: no local user");
            return;
        };

        self.with_channel("send_message", |handle| {
            handle.send(OutboundEvent::SendMessage(SendMessage {
                conversation_id: conversation_id.to_string(),
                content: content.to_string(),
                message_type,
                sender_id,
            }))
        });
    }

    pub fn send_text(&self, conversation_id: &str, content: &str) {
        self.send_message(conversation_id, content, MessageType::Text);
    }

    pub fn join_conversation(&self, conversation_id: &str) {
        self.with_channel("join_conversation", |handle| handle.join(conversation_id));
    }

    pub fn leave_conversation(&self, conversation_id: &str) {
        self.with_channel("leave_conversation", |handle| handle.leave(conversation_id));
    }

    /// Only notifies the server; the local flag flips when the server's
    /// `message_read` arrives.
    pub fn mark_message_as_read(&self, message_id: &str, conversation_id: &str) {
        self.with_channel("mark_message_read", |handle| {
            handle.send(OutboundEvent::MarkMessageRead(ReadReceipt {
                message_id: message_id.to_string(),
                conversation_id: conversation_id.to_string(),
            }))
        });
    }

    /// Flips the local flag right away, connected or not.
    pub fn mark_notification_as_read(&mut self, notification_id: &str) {
        self.store.mark_notification_read(notification_id);
        self.with_channel("mark_notification_read", |handle| {
            handle.send(OutboundEvent::MarkNotificationRead(notification_id.to_string()))
        });
    }

    pub fn clear_notifications(&mut self) {
        self.store.clear_notifications();
        self.with_channel("clear_notifications", |handle| {
            handle.send(OutboundEvent::ClearNotifications)
        });
    }

    // --- derived queries ---

    pub fn unread_notification_count(&self) -> usize {
        self.store.unread_notification_count()
    }

    pub fn is_user_online(&self, user_id: &str) -> bool {
        self.store.is_user_online(user_id)
    }
}
