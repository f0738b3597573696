//! PostgreSQL implementation of ReviewRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use carpool_core::entities::{Notification, Review};
use carpool_core::traits::{RatingSummary, RepoResult, ReviewRepository};
use carpool_core::value_objects::Snowflake;

use crate::models::{RatingSummaryModel, ReviewModel};

use super::error::{map_db_error, map_fk_violation, ride_not_found};
use super::notification::insert_notification;

/// PostgreSQL implementation of ReviewRepository
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    #[instrument(skip(self, review, ratee_notification), fields(review_id = %review.id))]
    async fn create(&self, review: &Review, ratee_notification: &Notification) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO reviews (id, rater_id, ratee_id, ride_id, score, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(review.id.into_inner())
        .bind(review.rater_id.into_inner())
        .bind(review.ratee_id.into_inner())
        .bind(review.ride_id.into_inner())
        .bind(review.score)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_fk_violation(e, || ride_not_found(review.ride_id)))?;

        insert_notification(&mut tx, ratee_notification).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_ratee(&self, ratee_id: Snowflake) -> RepoResult<Vec<Review>> {
        let result = sqlx::query_as::<_, ReviewModel>(
            r"
            SELECT id, rater_id, ratee_id, ride_id, score, comment, created_at
            FROM reviews
            WHERE ratee_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(ratee_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(Review::from).collect())
    }

    #[instrument(skip(self))]
    async fn summary(&self, ratee_id: Snowflake) -> RepoResult<RatingSummary> {
        let result = sqlx::query_as::<_, RatingSummaryModel>(
            r"
            SELECT AVG(score)::DOUBLE PRECISION AS average, COUNT(*) AS count
            FROM reviews
            WHERE ratee_id = $1
            ",
        )
        .bind(ratee_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(RatingSummary::from(result))
    }
}
