//! Review entity <-> model mapper

use carpool_core::entities::Review;
use carpool_core::traits::RatingSummary;
use carpool_core::value_objects::Snowflake;

use crate::models::{RatingSummaryModel, ReviewModel};

impl From<ReviewModel> for Review {
    fn from(model: ReviewModel) -> Self {
        Review {
            id: Snowflake::new(model.id),
            rater_id: Snowflake::new(model.rater_id),
            ratee_id: Snowflake::new(model.ratee_id),
            ride_id: Snowflake::new(model.ride_id),
            score: model.score,
            comment: model.comment,
            created_at: model.created_at,
        }
    }
}

impl From<RatingSummaryModel> for RatingSummary {
    fn from(model: RatingSummaryModel) -> Self {
        RatingSummary {
            average: model.average,
            count: model.count,
        }
    }
}
