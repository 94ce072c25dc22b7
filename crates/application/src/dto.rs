use serde::Serialize;
use uuid::Uuid;

use domain::{Message, Participant};

use crate::clock::wall_clock_label;

/// Wire shape of a presence record; `lastStatus` is milliseconds since epoch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub name: String,
    pub last_status: i64,
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            name: participant.name.to_string(),
            last_status: participant.last_status.timestamp_millis(),
        }
    }
}

/// Wire shape of a message. The id is exposed so clients can address deletes.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub to: String,
    pub from: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub time: String,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.into(),
            to: message.recipient.to_string(),
            from: message.sender.to_string(),
            text: message.body.to_string(),
            kind: message.kind.as_str().to_owned(),
            time: wall_clock_label(&message.sent_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::{MessageBody, MessageId, MessageKind, ParticipantName};

    #[test]
    fn message_dto_uses_wire_field_names() {
        let sent_at = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 20, 4, 37).unwrap();
        let message = Message::new(
            MessageId::from(Uuid::nil()),
            ParticipantName::parse("Bob").unwrap(),
            ParticipantName::parse("Alice").unwrap(),
            MessageBody::parse("oi").unwrap(),
            MessageKind::PrivateMessage,
            sent_at,
        );

        let value = serde_json::to_value(MessageDto::from(&message)).unwrap();
        assert_eq!(value["to"], "Bob");
        assert_eq!(value["from"], "Alice");
        assert_eq!(value["text"], "oi");
        assert_eq!(value["type"], "private_message");
        assert_eq!(value["time"], "20:04:37");
    }

    #[test]
    fn participant_dto_reports_millis() {
        let last_status = chrono::Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let participant = Participant::new(
            domain::ParticipantId::from(Uuid::nil()),
            ParticipantName::parse("Alice").unwrap(),
            last_status,
        );

        let value = serde_json::to_value(ParticipantDto::from(&participant)).unwrap();
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["lastStatus"], 1_700_000_000_123i64);
    }
}
