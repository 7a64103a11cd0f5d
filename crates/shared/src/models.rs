//! Data models carried over the realtime channel.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Messages ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub conversation_id: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_avatar: Option<String>,
}

/// Identifies a message that has been viewed by its recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub message_id: String,
    pub conversation_id: String,
}

/// Body of an outbound `send_message` frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub conversation_id: String,
    pub content: String,
    pub message_type: MessageType,
    pub sender_id: String,
}

// --- Notifications ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    Message,
    Booking,
    Application,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: NotificationType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Notification {
    /// The message a synthesized `message` notification points at, if any.
    pub fn message_id(&self) -> Option<&str> {
        self.data.as_ref()?.get("messageId")?.as_str()
    }
}

// --- Conversations ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub participants: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread_count: u32,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_uses_camel_case_fields() {
        let json = r#"{
            "id": "m1",
            "senderId": "u2",
            "receiverId": "u1",
            "content": "hi",
            "timestamp": "2024-05-01T10:00:00Z",
            "conversationId": "c1",
            "isRead": false,
            "messageType": "image",
            "senderName": "Bob"
        }"#;

        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.sender_id, "u2");
        assert_eq!(msg.message_type, MessageType::Image);
        assert_eq!(msg.sender_name.as_deref(), Some("Bob"));
        assert!(msg.sender_avatar.is_none());
    }

    #[test]
    fn message_defaults_read_flag_and_type() {
        let json = r#"{
            "id": "m1",
            "senderId": "u2",
            "receiverId": "u1",
            "content": "hi",
            "timestamp": "2024-05-01T10:00:00Z",
            "conversationId": "c1"
        }"#;

        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(!msg.is_read);
        assert_eq!(msg.message_type, MessageType::Text);
    }

    #[test]
    fn notification_type_field_is_named_type() {
        let json = r#"{
            "id": "n1",
            "type": "booking",
            "title": "Booking confirmed",
            "message": "See you Tuesday",
            "timestamp": "2024-05-01T10:00:00Z",
            "isRead": false,
            "data": {"bookingId": "b7"}
        }"#;

        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.r#type, NotificationType::Booking);
        assert_eq!(n.data.unwrap()["bookingId"], "b7");
    }

    #[test]
    fn message_id_reads_from_data() {
        let n = Notification {
            id: "n1".to_string(),
            r#type: NotificationType::Message,
            title: "t".to_string(),
            message: "m".to_string(),
            timestamp: Utc::now(),
            is_read: false,
            action_url: None,
            data: Some(serde_json::json!({ "messageId": "m9" })),
        };
        assert_eq!(n.message_id(), Some("m9"));
    }

    #[test]
    fn conversation_participants_are_a_set() {
        let json = r#"{
            "id": "c1",
            "participants": ["u2", "u1", "u2"],
            "unreadCount": 3,
            "updatedAt": "2024-05-01T10:00:00Z"
        }"#;

        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.participants.len(), 2);
        assert_eq!(conv.unread_count, 3);
        assert!(conv.last_message.is_none());
    }
}
