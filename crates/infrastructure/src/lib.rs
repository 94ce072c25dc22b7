//! 基础设施层：PostgreSQL 存储适配器。

pub mod repository;

pub use repository::{create_pg_pool, PgMessageRepository, PgParticipantRepository};
