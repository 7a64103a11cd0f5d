//! Realtime channel framing.
//!
//! Every frame is a JSON object of the form
//! `{"id": "...", "type": "<event>", "data": <payload>, "ts": "<rfc3339>"}`.
//! Inbound frames may omit `id` and `ts`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Conversation, Message, Notification, ReadReceipt, SendMessage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEnvelope<T> {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub payload: T,
    #[serde(default = "Utc::now")]
    pub ts: DateTime<Utc>,
}

impl<T> WsEnvelope<T> {
    /// Wrap a payload with a fresh frame id and the current time.
    pub fn new(payload: T) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload,
            ts: Utc::now(),
        }
    }
}

/// Events pushed by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    NewMessage(Message),
    MessageRead(ReadReceipt),
    NewNotification(Notification),
    UsersOnline(Vec<String>),
    UserOnline(String),
    UserOffline(String),
    ConversationUpdated(Conversation),
}

impl InboundEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::NewMessage(_) => "new_message",
            InboundEvent::MessageRead(_) => "message_read",
            InboundEvent::NewNotification(_) => "new_notification",
            InboundEvent::UsersOnline(_) => "users_online",
            InboundEvent::UserOnline(_) => "user_online",
            InboundEvent::UserOffline(_) => "user_offline",
            InboundEvent::ConversationUpdated(_) => "conversation_updated",
        }
    }
}

/// Commands sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    SendMessage(SendMessage),
    JoinConversation(String),
    LeaveConversation(String),
    MarkMessageRead(ReadReceipt),
    MarkNotificationRead(String),
    ClearNotifications,
}

pub type InboundFrame = WsEnvelope<InboundEvent>;
pub type OutboundFrame = WsEnvelope<OutboundEvent>;

/// Decode a single inbound frame from its JSON text.
pub fn decode_inbound(text: &str) -> Result<InboundFrame, serde_json::Error> {
    serde_json::from_str(text)
}

/// Response body of a long-poll request.
///
/// `events` holds raw frames so a single malformed entry can be skipped
/// without discarding the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PollBatch {
    pub cursor: u64,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageType;

    #[test]
    fn decodes_new_message_frame() {
        let text = r#"{
            "id": "f1",
            "type": "new_message",
            "data": {
                "id": "m1",
                "senderId": "u2",
                "receiverId": "u1",
                "content": "hi",
                "timestamp": "2024-05-01T10:00:00Z",
                "conversationId": "c1",
                "isRead": false,
                "messageType": "text"
            },
            "ts": "2024-05-01T10:00:01Z"
        }"#;

        let frame = decode_inbound(text).unwrap();
        assert_eq!(frame.id, "f1");
        match frame.payload {
            InboundEvent::NewMessage(msg) => assert_eq!(msg.id, "m1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn decodes_presence_frames_without_id_or_ts() {
        let frame = decode_inbound(r#"{"type":"user_online","data":"u7"}"#).unwrap();
        assert_eq!(frame.payload, InboundEvent::UserOnline("u7".to_string()));
        assert!(frame.id.is_empty());

        let frame = decode_inbound(r#"{"type":"users_online","data":["a","b"]}"#).unwrap();
        assert_eq!(
            frame.payload,
            InboundEvent::UsersOnline(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn rejects_frames_missing_fields() {
        // message_read without a messageId
        assert!(decode_inbound(r#"{"type":"message_read","data":{"conversationId":"c1"}}"#).is_err());
        assert!(decode_inbound(r#"{"type":"typing","data":{}}"#).is_err());
        assert!(decode_inbound("not json").is_err());
    }

    #[test]
    fn send_message_frame_shape() {
        let frame = WsEnvelope::new(OutboundEvent::SendMessage(SendMessage {
            conversation_id: "c1".to_string(),
            content: "hello".to_string(),
            message_type: MessageType::Text,
            sender_id: "u1".to_string(),
        }));

        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "send_message");
        assert_eq!(value["data"]["conversationId"], "c1");
        assert_eq!(value["data"]["messageType"], "text");
        assert_eq!(value["data"]["senderId"], "u1");
        assert!(!value["id"].as_str().unwrap().is_empty());
    }

    #[test]
    fn scalar_payload_frames() {
        let value =
            serde_json::to_value(WsEnvelope::new(OutboundEvent::JoinConversation("c1".into())))
                .unwrap();
        assert_eq!(value["type"], "join_conversation");
        assert_eq!(value["data"], "c1");

        let value = serde_json::to_value(WsEnvelope::new(OutboundEvent::ClearNotifications)).unwrap();
        assert_eq!(value["type"], "clear_notifications");
    }

    #[test]
    fn event_names_match_wire_tags() {
        let event = InboundEvent::UserOffline("u1".to_string());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], event.name());
    }
}
