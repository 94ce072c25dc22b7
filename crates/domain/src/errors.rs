use thiserror::Error;

/// 领域错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{field}: {reason}")]
    InvalidArgument { field: String, reason: String },
    #[error("participant name already in use")]
    ParticipantAlreadyExists,
    #[error("participant not found")]
    ParticipantNotFound,
    #[error("message not found")]
    MessageNotFound,
    #[error("only the original sender may delete a message")]
    NotMessageSender,
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 存储层错误类型
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("row not found")]
    NotFound,
    #[error("uniqueness conflict")]
    Conflict,
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
