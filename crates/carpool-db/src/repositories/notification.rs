//! PostgreSQL implementation of NotificationRepository

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use carpool_core::entities::Notification;
use carpool_core::error::DomainError;
use carpool_core::traits::{NotificationQuery, NotificationRepository, RepoResult};
use carpool_core::value_objects::Snowflake;

use crate::models::NotificationModel;

use super::error::{map_db_error, map_fk_violation, notification_not_found, raw_ids, user_not_found};

/// Insert one notification on an open connection or transaction
pub(super) async fn insert_notification(
    conn: &mut PgConnection,
    notification: &Notification,
) -> Result<(), DomainError> {
    sqlx::query(
        r"
        INSERT INTO notifications (id, user_id, sender_id, title, message, kind,
                                   related_ride_id, is_read, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(notification.id.into_inner())
    .bind(notification.user_id.into_inner())
    .bind(notification.sender_id.map(Snowflake::into_inner))
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.kind.as_str())
    .bind(notification.related_ride_id.map(Snowflake::into_inner))
    .bind(notification.is_read)
    .bind(notification.created_at)
    .execute(conn)
    .await
    .map_err(|e| map_fk_violation(e, || user_not_found(notification.user_id)))?;

    Ok(())
}

/// PostgreSQL implementation of NotificationRepository
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    #[instrument(skip(self, notification), fields(notification_id = %notification.id))]
    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
        insert_notification(&mut conn, notification).await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>> {
        let result = sqlx::query_as::<_, NotificationModel>(
            r"
            SELECT id, user_id, sender_id, title, message, kind, related_ride_id, is_read, created_at
            FROM notifications
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Notification::from))
    }

    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Notification>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = sqlx::query_as::<_, NotificationModel>(
            r"
            SELECT id, user_id, sender_id, title, message, kind, related_ride_id, is_read, created_at
            FROM notifications
            WHERE id = ANY($1)
            ",
        )
        .bind(raw_ids(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(Notification::from).collect())
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        user_id: Snowflake,
        query: &NotificationQuery,
    ) -> RepoResult<Vec<Notification>> {
        // LIMIT NULL is no limit
        let result = sqlx::query_as::<_, NotificationModel>(
            r"
            SELECT id, user_id, sender_id, title, message, kind, related_ride_id, is_read, created_at
            FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(user_id.into_inner())
        .bind(query.unread_only)
        .bind(query.limit)
        .bind(query.offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(Notification::from).collect())
    }

    #[instrument(skip(self))]
    async fn unread_count(&self, user_id: Snowflake) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read
            ",
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(notification_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self, user_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read
            ",
        )
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(notification_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_many(&self, user_id: Snowflake, ids: &[Snowflake]) -> RepoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id.into_inner())
            .bind(raw_ids(ids))
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self, user_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
