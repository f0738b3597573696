//! Review entity - a 1-5 rating left after sharing a ride

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: Snowflake,
    pub rater_id: Snowflake,
    pub ratee_id: Snowflake,
    pub ride_id: Snowflake,
    pub score: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub const MIN_SCORE: i16 = 1;
    pub const MAX_SCORE: i16 = 5;

    pub fn new(
        id: Snowflake,
        rater_id: Snowflake,
        ratee_id: Snowflake,
        ride_id: Snowflake,
        score: i16,
        comment: String,
    ) -> Self {
        Self {
            id,
            rater_id,
            ratee_id,
            ride_id,
            score,
            comment,
            created_at: Utc::now(),
        }
    }

    pub fn is_valid_score(score: i16) -> bool {
        (Self::MIN_SCORE..=Self::MAX_SCORE).contains(&score)
    }
}
