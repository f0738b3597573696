//! Review database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reviews table
#[derive(Debug, Clone, FromRow)]
pub struct ReviewModel {
    pub id: i64,
    pub rater_id: i64,
    pub ratee_id: i64,
    pub ride_id: i64,
    pub score: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate row for a ratee's scores
#[derive(Debug, Clone, FromRow)]
pub struct RatingSummaryModel {
    pub average: Option<f64>,
    pub count: i64,
}
