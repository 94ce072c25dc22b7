use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use application::{MessageRepository, ParticipantRepository};
use domain::{
    Message, MessageBody, MessageId, MessageKind, Participant, ParticipantId, ParticipantName,
    RepositoryError, Timestamp, BROADCAST_TARGET,
};

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict;
        }
    }
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

/// Build the shared PostgreSQL pool. Acquiring a connection carries an
/// explicit timeout budget so a saturated pool fails the request instead of
/// hanging it.
pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

#[derive(Debug, FromRow)]
struct ParticipantRecord {
    id: Uuid,
    name: String,
    last_status: DateTime<Utc>,
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = RepositoryError;

    fn try_from(value: ParticipantRecord) -> Result<Self, Self::Error> {
        let name =
            ParticipantName::parse(value.name).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Participant {
            id: ParticipantId::from(value.id),
            name,
            last_status: value.last_status,
        })
    }
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    recipient: String,
    sender: String,
    body: String,
    kind: MessageKind,
    sent_at: DateTime<Utc>,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let recipient =
            ParticipantName::parse(value.recipient).map_err(|err| invalid_data(err.to_string()))?;
        let sender =
            ParticipantName::parse(value.sender).map_err(|err| invalid_data(err.to_string()))?;
        let body = MessageBody::parse(value.body).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Message::new(
            MessageId::from(value.id),
            recipient,
            sender,
            body,
            value.kind,
            value.sent_at,
        ))
    }
}

#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    async fn insert(&self, participant: Participant) -> Result<Participant, RepositoryError> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            r#"
            INSERT INTO participants (id, name, last_status)
            VALUES ($1, $2, $3)
            RETURNING id, name, last_status
            "#,
        )
        .bind(Uuid::from(participant.id))
        .bind(participant.name.as_str())
        .bind(participant.last_status)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Participant::try_from(record)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Participant>, RepositoryError> {
        let record = sqlx::query_as::<_, ParticipantRecord>(
            "SELECT id, name, last_status FROM participants WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Participant::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Participant>, RepositoryError> {
        let records = sqlx::query_as::<_, ParticipantRecord>(
            "SELECT id, name, last_status FROM participants",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Participant::try_from).collect()
    }

    async fn touch(&self, id: ParticipantId, at: Timestamp) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE participants SET last_status = $2 WHERE id = $1")
            .bind(Uuid::from(id))
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        // zero rows means the reaper won the race; never re-insert
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: ParticipantId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(&self, message: Message) -> Result<MessageId, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, recipient, sender, body, kind, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::from(message.id))
        .bind(message.recipient.as_str())
        .bind(message.sender.as_str())
        .bind(message.body.as_str())
        .bind(message.kind)
        .bind(message.sent_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(message.id)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            "SELECT id, recipient, sender, body, kind, sent_at FROM messages WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Message::try_from).transpose()
    }

    async fn list_visible(
        &self,
        viewer: &ParticipantName,
        limit: Option<u32>,
    ) -> Result<Vec<Message>, RepositoryError> {
        // Insertion order (seq) stands in for the store's natural order; a
        // NULL limit means the whole log.
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, recipient, sender, body, kind, sent_at
            FROM messages
            WHERE kind = 'message' OR recipient = $1 OR sender = $1 OR recipient = $2
            ORDER BY seq DESC
            LIMIT $3
            "#,
        )
        .bind(viewer.as_str())
        .bind(BROADCAST_TARGET)
        .bind(limit.map(|limit| limit as i64))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Message::try_from).collect()
    }

    async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
