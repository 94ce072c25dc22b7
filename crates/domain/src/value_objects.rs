use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;
use crate::message::BROADCAST_TARGET;
use crate::sanitize::strip_markup;

/// 统一的时间戳类型。
pub type Timestamp = DateTime<Utc>;

/// 参与者唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub Uuid);

impl ParticipantId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ParticipantId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<ParticipantId> for Uuid {
    fn from(value: ParticipantId) -> Self {
        value.0
    }
}

/// 消息唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for MessageId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<MessageId> for Uuid {
    fn from(value: MessageId) -> Self {
        value.0
    }
}

/// 经过清洗和校验的显示名。
///
/// Also used for message recipients, where the reserved broadcast name is a
/// legal value. Comparison is case-sensitive exact match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantName(String);

impl ParticipantName {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = strip_markup(&value.into()).trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("name", "cannot be empty"));
        }
        Ok(Self(value))
    }

    /// The reserved recipient meaning "all participants".
    pub fn broadcast() -> Self {
        Self(BROADCAST_TARGET.to_owned())
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == BROADCAST_TARGET
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 消息正文内容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = strip_markup(&value.into()).trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("text", "cannot be empty"));
        }
        Ok(Self(value))
    }

    /// System-generated notice text, exempt from user-facing validation.
    pub fn notice(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
