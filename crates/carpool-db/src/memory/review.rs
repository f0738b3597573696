//! In-memory ReviewRepository

use async_trait::async_trait;

use carpool_core::entities::{Notification, Review};
use carpool_core::traits::{RatingSummary, RepoResult, ReviewRepository};
use carpool_core::value_objects::Snowflake;

use super::store::MemoryStore;

#[derive(Clone, Debug)]
pub struct MemoryReviewRepository {
    store: MemoryStore,
}

impl MemoryReviewRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn create(&self, review: &Review, ratee_notification: &Notification) -> RepoResult<()> {
        let mut tables = self.store.lock();
        tables.require_user(review.rater_id)?;
        tables.require_user(review.ratee_id)?;
        tables.require_ride(review.ride_id)?;
        // Checks the recipient before anything is written
        tables.insert_notification(ratee_notification)?;
        tables.reviews.push(review.clone());
        Ok(())
    }

    async fn find_by_ratee(&self, ratee_id: Snowflake) -> RepoResult<Vec<Review>> {
        let mut found: Vec<Review> = self
            .store
            .lock()
            .reviews
            .iter()
            .filter(|r| r.ratee_id == ratee_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn summary(&self, ratee_id: Snowflake) -> RepoResult<RatingSummary> {
        let tables = self.store.lock();
        let scores: Vec<f64> = tables
            .reviews
            .iter()
            .filter(|r| r.ratee_id == ratee_id)
            .map(|r| f64::from(r.score))
            .collect();

        let count = scores.len() as i64;
        let average = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };
        Ok(RatingSummary { average, count })
    }
}
