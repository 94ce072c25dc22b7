use async_trait::async_trait;
use domain::{
    Message, MessageId, Participant, ParticipantId, ParticipantName, RepositoryError, Timestamp,
};

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Persist a new presence record. `Conflict` when the name is already
    /// held by a live participant.
    async fn insert(&self, participant: Participant) -> Result<Participant, RepositoryError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Participant>, RepositoryError>;

    async fn list(&self) -> Result<Vec<Participant>, RepositoryError>;

    /// Refresh `last_status` in place. `NotFound` when the row is already
    /// gone; the record is never re-created.
    async fn touch(&self, id: ParticipantId, at: Timestamp) -> Result<(), RepositoryError>;

    async fn delete(&self, id: ParticipantId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: Message) -> Result<MessageId, RepositoryError>;

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    /// Messages visible to `viewer` in reverse insertion order (newest
    /// first), at most `limit` of them; `None` means the whole log.
    async fn list_visible(
        &self,
        viewer: &ParticipantName,
        limit: Option<u32>,
    ) -> Result<Vec<Message>, RepositoryError>;

    async fn delete(&self, id: MessageId) -> Result<(), RepositoryError>;
}

/// 内存实现（用于测试）
pub mod memory {
    use std::collections::HashMap;

    use tokio::sync::RwLock;

    use super::*;

    #[derive(Default)]
    pub struct MemoryParticipantRepository {
        rows: RwLock<HashMap<ParticipantId, Participant>>,
    }

    impl MemoryParticipantRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl ParticipantRepository for MemoryParticipantRepository {
        async fn insert(&self, participant: Participant) -> Result<Participant, RepositoryError> {
            let mut rows = self.rows.write().await;
            if rows.values().any(|row| row.name == participant.name) {
                return Err(RepositoryError::Conflict);
            }
            rows.insert(participant.id, participant.clone());
            Ok(participant)
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Participant>, RepositoryError> {
            let rows = self.rows.read().await;
            Ok(rows.values().find(|row| row.name.as_str() == name).cloned())
        }

        async fn list(&self) -> Result<Vec<Participant>, RepositoryError> {
            let rows = self.rows.read().await;
            Ok(rows.values().cloned().collect())
        }

        async fn touch(&self, id: ParticipantId, at: Timestamp) -> Result<(), RepositoryError> {
            let mut rows = self.rows.write().await;
            match rows.get_mut(&id) {
                Some(row) => {
                    row.last_status = at;
                    Ok(())
                }
                None => Err(RepositoryError::NotFound),
            }
        }

        async fn delete(&self, id: ParticipantId) -> Result<(), RepositoryError> {
            let mut rows = self.rows.write().await;
            rows.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
        }
    }

    /// Messages are held in insertion order, which is what the recency query
    /// walks backwards over.
    #[derive(Default)]
    pub struct MemoryMessageRepository {
        rows: RwLock<Vec<Message>>,
    }

    impl MemoryMessageRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl MessageRepository for MemoryMessageRepository {
        async fn insert(&self, message: Message) -> Result<MessageId, RepositoryError> {
            let mut rows = self.rows.write().await;
            let id = message.id;
            rows.push(message);
            Ok(id)
        }

        async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
            let rows = self.rows.read().await;
            Ok(rows.iter().find(|row| row.id == id).cloned())
        }

        async fn list_visible(
            &self,
            viewer: &ParticipantName,
            limit: Option<u32>,
        ) -> Result<Vec<Message>, RepositoryError> {
            let rows = self.rows.read().await;
            let visible = rows.iter().rev().filter(|row| row.is_visible_to(viewer));
            Ok(match limit {
                Some(limit) => visible.take(limit as usize).cloned().collect(),
                None => visible.cloned().collect(),
            })
        }

        async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
            let mut rows = self.rows.write().await;
            match rows.iter().position(|row| row.id == id) {
                Some(index) => {
                    rows.remove(index);
                    Ok(())
                }
                None => Err(RepositoryError::NotFound),
            }
        }
    }
}
