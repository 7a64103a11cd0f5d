//! Inbound event router.
//!
//! Applies one server event to the store. Handlers only look at the event
//! and the current store contents; nothing is buffered between events.

use livesync_shared::InboundEvent;

use crate::stores::{notifications, StoreChange, SyncStore};

/// Apply `event` and report which collections changed. An empty result
/// means the event was a no-op (redelivery, unknown id, ...).
pub fn route(store: &mut SyncStore, local_user: Option<&str>, event: InboundEvent) -> Vec<StoreChange> {
    let mut changes = Vec::new();

    match event {
        InboundEvent::NewMessage(msg) => {
            let own = local_user == Some(msg.sender_id.as_str());
            let notification = (!own).then(|| notifications::for_message(&msg));
            let id = msg.id.clone();

            if store.add_message(msg) {
                changes.push(StoreChange::Messages);
                if let Some(notification) = notification {
                    store.push_notification(notification);
                    changes.push(StoreChange::Notifications);
                }
            } else {
                tracing::debug!("Ignoring redelivered message {}", id);
            }
        }
        InboundEvent::MessageRead(receipt) => {
            if store.mark_message_read(&receipt.message_id) {
                changes.push(StoreChange::Messages);
            }
        }
        InboundEvent::NewNotification(notification) => {
            store.push_notification(notification);
            changes.push(StoreChange::Notifications);
        }
        InboundEvent::UsersOnline(users) => {
            store.set_online_users(users);
            changes.push(StoreChange::Presence);
        }
        InboundEvent::UserOnline(user_id) => {
            if store.user_online(user_id) {
                changes.push(StoreChange::Presence);
            }
        }
        InboundEvent::UserOffline(user_id) => {
            if store.user_offline(&user_id) {
                changes.push(StoreChange::Presence);
            }
        }
        InboundEvent::ConversationUpdated(conversation) => {
            store.upsert_conversation(conversation);
            changes.push(StoreChange::Conversations);
        }
    }

    changes
}
