use std::sync::Arc;

use domain::{
    DomainError, Message, MessageId, Participant, ParticipantId, ParticipantName, RepositoryError,
    JOINED_NOTICE,
};
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{MessageRepository, ParticipantRepository},
};

#[derive(Debug, Clone)]
pub struct RegisterParticipantRequest {
    pub name: String,
}

pub struct ParticipantServiceDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct ParticipantService {
    deps: ParticipantServiceDependencies,
}

impl ParticipantService {
    pub fn new(deps: ParticipantServiceDependencies) -> Self {
        Self { deps }
    }

    /// Register a presence record and announce the arrival with a broadcast
    /// status notice.
    pub async fn register(
        &self,
        request: RegisterParticipantRequest,
    ) -> Result<Participant, ApplicationError> {
        let name = ParticipantName::parse(request.name)?;

        if self
            .deps
            .participant_repository
            .find_by_name(name.as_str())
            .await?
            .is_some()
        {
            return Err(DomainError::ParticipantAlreadyExists.into());
        }

        let now = self.deps.clock.now();
        let participant = Participant::new(ParticipantId::from(Uuid::new_v4()), name.clone(), now);

        // Two registrations can race past the pre-check; the store's
        // uniqueness constraint settles the tie.
        let stored = self
            .deps
            .participant_repository
            .insert(participant)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ApplicationError::Domain(DomainError::ParticipantAlreadyExists)
                }
                other => ApplicationError::Repository(other),
            })?;

        let notice = Message::status(
            MessageId::from(Uuid::new_v4()),
            name.clone(),
            JOINED_NOTICE,
            now,
        );
        self.deps.message_repository.insert(notice).await?;

        tracing::info!(participant = %name, "participant joined");
        Ok(stored)
    }

    /// Refresh the caller's liveness timestamp.
    pub async fn touch(&self, name: &str) -> Result<(), ApplicationError> {
        let participant = self
            .deps
            .participant_repository
            .find_by_name(name)
            .await?
            .ok_or(DomainError::ParticipantNotFound)?;

        match self
            .deps
            .participant_repository
            .touch(participant.id, self.deps.clock.now())
            .await
        {
            Ok(()) => Ok(()),
            // Evicted between the lookup and the update: report the absence,
            // never re-create the record.
            Err(RepositoryError::NotFound) => Err(DomainError::ParticipantNotFound.into()),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn list(&self) -> Result<Vec<Participant>, ApplicationError> {
        Ok(self.deps.participant_repository.list().await?)
    }

    pub async fn exists(&self, name: &str) -> Result<bool, ApplicationError> {
        Ok(self
            .deps
            .participant_repository
            .find_by_name(name)
            .await?
            .is_some())
    }
}
