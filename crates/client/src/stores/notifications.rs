//! Notification collection, most recent first.

use chrono::Utc;
use livesync_shared::{Message, MessageType, Notification, NotificationType};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NotificationStore {
    notifications: Vec<Notification>,
}

impl NotificationStore {
    pub fn all(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    pub fn prepend(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
    }

    /// Returns true only if the flag changed.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.is_read => {
                n.is_read = true;
                true
            }
            _ => false,
        }
    }

    /// Returns true if anything was removed.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.notifications.is_empty();
        self.notifications.clear();
        had_any
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }
}

/// Build the local notification shown for a message from someone else.
pub fn for_message(msg: &Message) -> Notification {
    let sender = msg.sender_name.as_deref().unwrap_or("someone");
    let body = match msg.message_type {
        MessageType::Text => msg.content.clone(),
        MessageType::Image => "Sent an image".to_string(),
        MessageType::File => "Sent a file".to_string(),
    };

    Notification {
        id: uuid::Uuid::new_v4().to_string(),
        r#type: NotificationType::Message,
        title: format!("New message from {}", sender),
        message: body,
        timestamp: Utc::now(),
        is_read: false,
        action_url: Some(format!("/messages/{}", msg.conversation_id)),
        data: Some(serde_json::json!({
            "messageId": msg.id,
            "conversationId": msg.conversation_id,
            "senderId": msg.sender_id,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::test_support::{message, notification};

    #[test]
    fn prepend_puts_newest_first() {
        let mut store = NotificationStore::default();
        store.prepend(notification("n1"));
        store.prepend(notification("n2"));

        assert_eq!(store.all()[0].id, "n2");
        assert_eq!(store.all()[1].id, "n1");
    }

    #[test]
    fn unread_count_tracks_mark_read() {
        let mut store = NotificationStore::default();
        store.prepend(notification("n1"));
        store.prepend(notification("n2"));
        assert_eq!(store.unread_count(), 2);

        assert!(store.mark_read("n1"));
        assert!(!store.mark_read("n1"));
        assert!(!store.mark_read("missing"));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn clear_empties_collection() {
        let mut store = NotificationStore::default();
        assert!(!store.clear());
        store.prepend(notification("n1"));
        assert!(store.clear());
        assert!(store.is_empty());
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn message_notification_content() {
        let mut msg = message("m1", "u2", "c1");
        msg.sender_name = Some("Bob".to_string());

        let n = for_message(&msg);
        assert_eq!(n.r#type, NotificationType::Message);
        assert_eq!(n.title, "New message from Bob");
        assert_eq!(n.message, msg.content);
        assert_eq!(n.action_url.as_deref(), Some("/messages/c1"));
        assert_eq!(n.message_id(), Some("m1"));
        assert!(!n.is_read);
    }

    #[test]
    fn attachment_messages_get_a_summary() {
        let mut msg = message("m1", "u2", "c1");
        msg.message_type = MessageType::Image;
        assert_eq!(for_message(&msg).message, "Sent an image");

        msg.message_type = MessageType::File;
        msg.sender_name = None;
        let n = for_message(&msg);
        assert_eq!(n.message, "Sent a file");
        assert_eq!(n.title, "New message from someone");
    }
}
