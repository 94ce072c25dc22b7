use serde::{Deserialize, Serialize};

use crate::value_objects::{MessageBody, MessageId, ParticipantName, Timestamp};

/// 保留的广播收件人名称。
pub const BROADCAST_TARGET: &str = "Todos";

/// Notice texts used by the system-generated join/leave status messages.
pub const JOINED_NOTICE: &str = "entra na sala...";
pub const LEFT_NOTICE: &str = "sai da sala...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Message,
    PrivateMessage,
    Status,
}

impl MessageKind {
    /// Parse a client-supplied message type. `status` is system-generated
    /// only and never accepted from a client.
    pub fn parse_user_kind(value: &str) -> Result<Self, crate::DomainError> {
        match value {
            "message" => Ok(Self::Message),
            "private_message" => Ok(Self::PrivateMessage),
            _ => Err(crate::DomainError::invalid_argument(
                "type",
                "must be 'message' or 'private_message'",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::PrivateMessage => "private_message",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub recipient: ParticipantName,
    pub sender: ParticipantName,
    pub body: MessageBody,
    pub kind: MessageKind,
    pub sent_at: Timestamp,
}

impl Message {
    pub fn new(
        id: MessageId,
        recipient: ParticipantName,
        sender: ParticipantName,
        body: MessageBody,
        kind: MessageKind,
        sent_at: Timestamp,
    ) -> Self {
        Self {
            id,
            recipient,
            sender,
            body,
            kind,
            sent_at,
        }
    }

    /// System-generated join/leave notice, addressed to everyone and authored
    /// by the participant it describes.
    pub fn status(id: MessageId, sender: ParticipantName, text: &str, sent_at: Timestamp) -> Self {
        Self {
            id,
            recipient: ParticipantName::broadcast(),
            sender,
            body: MessageBody::notice(text),
            kind: MessageKind::Status,
            sent_at,
        }
    }

    /// Visibility rule: broadcasts are visible to everyone; anything else only
    /// to its sender, its recipient, or everyone when addressed to the
    /// broadcast target (status notices fall in that last bucket).
    pub fn is_visible_to(&self, viewer: &ParticipantName) -> bool {
        self.kind == MessageKind::Message
            || self.recipient == *viewer
            || self.sender == *viewer
            || self.recipient.is_broadcast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn name(value: &str) -> ParticipantName {
        ParticipantName::parse(value).unwrap()
    }

    fn message(kind: MessageKind, to: &str, from: &str) -> Message {
        Message::new(
            MessageId::from(Uuid::new_v4()),
            name(to),
            name(from),
            MessageBody::parse("hello").unwrap(),
            kind,
            Utc::now(),
        )
    }

    #[test]
    fn broadcasts_are_visible_to_everyone() {
        let msg = message(MessageKind::Message, BROADCAST_TARGET, "Alice");
        assert!(msg.is_visible_to(&name("Bob")));
        assert!(msg.is_visible_to(&name("Alice")));
    }

    #[test]
    fn private_messages_are_visible_to_both_ends_only() {
        let msg = message(MessageKind::PrivateMessage, "Bob", "Alice");
        assert!(msg.is_visible_to(&name("Bob")));
        assert!(msg.is_visible_to(&name("Alice")));
        assert!(!msg.is_visible_to(&name("Carol")));
    }

    #[test]
    fn status_notices_are_visible_to_everyone() {
        let msg = Message::status(
            MessageId::from(Uuid::new_v4()),
            name("Alice"),
            JOINED_NOTICE,
            Utc::now(),
        );
        assert!(msg.is_visible_to(&name("Carol")));
    }

    #[test]
    fn kind_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&MessageKind::PrivateMessage).unwrap(),
            "\"private_message\""
        );
        assert!(MessageKind::parse_user_kind("status").is_err());
        assert!(MessageKind::parse_user_kind("banana").is_err());
        assert_eq!(
            MessageKind::parse_user_kind("message").unwrap(),
            MessageKind::Message
        );
    }
}
