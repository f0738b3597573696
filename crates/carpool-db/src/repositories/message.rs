//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use carpool_core::entities::Message;
use carpool_core::traits::{MessageRepository, RepoResult};
use carpool_core::value_objects::Snowflake;

use crate::models::MessageModel;

use super::error::{map_db_error, map_fk_violation, user_not_found};

/// PostgreSQL implementation of MessageRepository
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
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO messages (id, sender_id, receiver_id, content, sent_at, is_read)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(message.receiver_id.into_inner())
        .bind(&message.content)
        .bind(message.timestamp)
        .bind(message.is_read)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || user_not_found(message.receiver_id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn conversation(&self, a: Snowflake, b: Snowflake) -> RepoResult<Vec<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, sender_id, receiver_id, content, sent_at, is_read
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY sent_at ASC, id ASC
            ",
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_conversation_read(
        &self,
        reader_id: Snowflake,
        other_id: Snowflake,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE messages SET is_read = TRUE
            WHERE sender_id = $2 AND receiver_id = $1 AND NOT is_read
            ",
        )
        .bind(reader_id.into_inner())
        .bind(other_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn contact_ids(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        // Most recent conversation first
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT contact_id
            FROM (
                SELECT CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END AS contact_id,
                       MAX(sent_at) AS last_at
                FROM messages
                WHERE sender_id = $1 OR receiver_id = $1
                GROUP BY 1
            ) contacts
            ORDER BY last_at DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }
}
