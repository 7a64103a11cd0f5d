//! Local state for one session.
//!
//! [`SyncStore`] owns four independent collections. Consumers read
//! snapshots through the accessors and learn about changes from
//! [`SyncStore::subscribe`]. Every mutation goes through `&mut self`, so
//! updates are applied one at a time in the order they are made.

pub mod conversations;
pub mod messages;
pub mod notifications;
pub mod presence;

use std::collections::HashSet;

use livesync_shared::{Conversation, Message, Notification};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub use conversations::ConversationStore;
pub use messages::MessageStore;
pub use notifications::NotificationStore;
pub use presence::PresenceStore;

/// Which collection changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreChange {
    Messages,
    Notifications,
    Conversations,
    Presence,
}

#[derive(Debug, Default)]
pub struct SyncStore {
    messages: MessageStore,
    notifications: NotificationStore,
    conversations: ConversationStore,
    presence: PresenceStore,
    listeners: Vec<UnboundedSender<StoreChange>>,
}

impl SyncStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive a [`StoreChange`] after every mutation. Dropping the
    /// receiver unsubscribes.
    ///
    /// The channel is unbounded: a receiver that is kept but never read
    /// accumulates one entry per mutation. Drain it or drop it.
    pub fn subscribe(&mut self) -> UnboundedReceiver<StoreChange> {
        let (tx, rx) = unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    fn notify(&mut self, change: StoreChange) {
        self.listeners.retain(|tx| tx.send(change).is_ok());
    }

    // --- snapshots ---

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn online_users(&self) -> &HashSet<String> {
        self.presence.online()
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    pub fn messages_in<'a>(
        &'a self,
        conversation_id: &'a str,
    ) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages.in_conversation(conversation_id)
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.get(id)
    }

    // --- derived queries ---

    /// Count of notifications not yet marked read. Recomputed on every call.
    pub fn unread_notification_count(&self) -> usize {
        self.notifications.unread_count()
    }

    pub fn is_user_online(&self, user_id: &str) -> bool {
        self.presence.is_online(user_id)
    }

    // --- mutations ---

    /// Drop all collected state (a different user signed in). Subscribers
    /// are kept and told that everything changed.
    pub fn reset(&mut self) {
        self.messages = MessageStore::default();
        self.notifications = NotificationStore::default();
        self.conversations = ConversationStore::default();
        self.presence = PresenceStore::default();
        for change in [
            StoreChange::Messages,
            StoreChange::Notifications,
            StoreChange::Conversations,
            StoreChange::Presence,
        ] {
            self.notify(change);
        }
    }

    /// Returns false for a redelivered id.
    pub fn add_message(&mut self, msg: Message) -> bool {
        let added = self.messages.append(msg);
        if added {
            self.notify(StoreChange::Messages);
        }
        added
    }

    pub fn mark_message_read(&mut self, id: &str) -> bool {
        let changed = self.messages.mark_read(id);
        if changed {
            self.notify(StoreChange::Messages);
        }
        changed
    }

    /// Merge REST-fetched history. Returns the number of new messages.
    pub fn merge_history(&mut self, history: Vec<Message>) -> usize {
        let added = self.messages.merge_history(history);
        if added > 0 {
            self.notify(StoreChange::Messages);
        }
        added
    }

    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.prepend(notification);
        self.notify(StoreChange::Notifications);
    }

    pub fn mark_notification_read(&mut self, id: &str) -> bool {
        let changed = self.notifications.mark_read(id);
        if changed {
            self.notify(StoreChange::Notifications);
        }
        changed
    }

    pub fn clear_notifications(&mut self) -> bool {
        let changed = self.notifications.clear();
        if changed {
            self.notify(StoreChange::Notifications);
        }
        changed
    }

    pub fn upsert_conversation(&mut self, conversation: Conversation) {
        self.conversations.upsert(conversation);
        self.notify(StoreChange::Conversations);
    }

    /// Merge a REST-fetched conversation list.
    pub fn seed_conversations(&mut self, list: Vec<Conversation>) -> bool {
        let changed = self.conversations.seed(list);
        if changed {
            self.notify(StoreChange::Conversations);
        }
        changed
    }

    pub fn set_online_users(&mut self, users: Vec<String>) {
        self.presence.replace(users);
        self.notify(StoreChange::Presence);
    }

    pub fn user_online(&mut self, user_id: String) -> bool {
        let changed = self.presence.add(user_id);
        if changed {
            self.notify(StoreChange::Presence);
        }
        changed
    }

    pub fn user_offline(&mut self, user_id: &str) -> bool {
        let changed = self.presence.remove(user_id);
        if changed {
            self.notify(StoreChange::Presence);
        }
        changed
    }
}
