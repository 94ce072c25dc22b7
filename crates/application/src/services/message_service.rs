use std::sync::Arc;

use domain::{
    DomainError, Message, MessageBody, MessageId, MessageKind, Participant, ParticipantName,
    RepositoryError,
};
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{MessageRepository, ParticipantRepository},
};

#[derive(Debug, Clone)]
pub struct PostMessageRequest {
    /// Raw `user` header value naming the acting participant.
    pub sender: String,
    pub to: String,
    pub text: String,
    pub kind: String,
}

pub struct MessageServiceDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    /// Every message operation requires a live participant as its actor.
    /// The lookup uses the raw header value; an evicted or never-registered
    /// name fails here.
    async fn authorize(&self, actor: &str) -> Result<Participant, ApplicationError> {
        self.deps
            .participant_repository
            .find_by_name(actor)
            .await?
            .ok_or(ApplicationError::Authentication)
    }

    pub async fn post(&self, request: PostMessageRequest) -> Result<Message, ApplicationError> {
        let sender = self.authorize(&request.sender).await?;

        let kind = MessageKind::parse_user_kind(&request.kind)?;
        let recipient = ParticipantName::parse(request.to)
            .map_err(|_| DomainError::invalid_argument("to", "cannot be empty"))?;
        let body = MessageBody::parse(request.text)?;

        let message = Message::new(
            MessageId::from(Uuid::new_v4()),
            recipient,
            sender.name.clone(),
            body,
            kind,
            self.deps.clock.now(),
        );

        // The sender may be evicted between the check above and this insert;
        // that window is accepted, the message simply lands last.
        let id = self.deps.message_repository.insert(message.clone()).await?;

        tracing::debug!(message_id = %id, kind = kind.as_str(), "message appended");
        Ok(message)
    }

    /// Messages visible to `viewer`, oldest first. `limit` keeps the most
    /// recent N after the visibility filter is applied.
    pub async fn recent(
        &self,
        viewer: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Message>, ApplicationError> {
        let viewer = self.authorize(viewer).await?;

        // Fetched newest-first so the limit lands on the most recent entries,
        // then reversed into chronological presentation order.
        let mut messages = self
            .deps
            .message_repository
            .list_visible(&viewer.name, limit)
            .await?;
        messages.reverse();
        Ok(messages)
    }

    /// Delete a message; only its original sender may do so.
    pub async fn remove(&self, id: Uuid, requester: &str) -> Result<(), ApplicationError> {
        let requester = self
            .deps
            .participant_repository
            .find_by_name(requester)
            .await?
            .ok_or(DomainError::ParticipantNotFound)?;

        let message = self
            .deps
            .message_repository
            .find_by_id(MessageId::from(id))
            .await?
            .ok_or(DomainError::MessageNotFound)?;

        if message.sender != requester.name {
            return Err(DomainError::NotMessageSender.into());
        }

        match self.deps.message_repository.delete(message.id).await {
            Ok(()) => {
                tracing::info!(message_id = %message.id, requester = %requester.name, "message deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(DomainError::MessageNotFound.into()),
            Err(other) => Err(other.into()),
        }
    }
}
