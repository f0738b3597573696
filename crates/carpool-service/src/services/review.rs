//! Review service
//!
//! Scores users leave for each other after a ride, and the averages built from them.

use std::collections::HashMap;

use carpool_core::entities::{Notification, NotificationType, Review, User};
use carpool_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{CreateReviewRequest, RatingResponse, ReviewResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::notification::{Companion, NotificationService};

/// Review service
pub struct ReviewService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReviewService<'a> {
    /// Create a new ReviewService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Leave a review and let the reviewed user know
    #[instrument(skip(self, request), fields(ratee_id = %request.ratee_id, ride_id = %request.ride_id))]
    pub async fn create(
        &self,
        rater_id: Snowflake,
        request: &CreateReviewRequest,
    ) -> ServiceResult<ReviewResponse> {
        if !Review::is_valid_score(request.score) {
            return Err(DomainError::InvalidScore.into());
        }
        if rater_id == request.ratee_id {
            return Err(DomainError::CannotReviewSelf.into());
        }

        let rater = self.require_user(rater_id).await?;
        self.require_user(request.ratee_id).await?;
        self.ctx
            .ride_repo()
            .find_by_id(request.ride_id)
            .await?
            .ok_or(DomainError::RideNotFound(request.ride_id))?;

        let review = Review::new(
            self.ctx.generate_id(),
            rater_id,
            request.ratee_id,
            request.ride_id,
            request.score,
            request.comment.trim().to_string(),
        );
        let notification = Notification::new(
            self.ctx.generate_id(),
            review.ratee_id,
            "New review",
            format!("{} rated you {}/5", rater.first_name, review.score),
            NotificationType::Info,
        )
        .from_sender(rater_id)
        .for_ride(review.ride_id);

        self.ctx.review_repo().create(&review, &notification).await?;

        info!(review_id = %review.id, score = review.score, "Review created");

        NotificationService::new(self.ctx).push(&notification, Companion::None);

        Ok(ReviewResponse::build(&review, Some(&rater)))
    }

    /// Reviews about a user, newest first
    #[instrument(skip(self))]
    pub async fn list(&self, ratee_id: Snowflake) -> ServiceResult<Vec<ReviewResponse>> {
        let reviews = self.ctx.review_repo().find_by_ratee(ratee_id).await?;

        let mut rater_ids: Vec<Snowflake> = reviews.iter().map(|r| r.rater_id).collect();
        rater_ids.sort_unstable();
        rater_ids.dedup();
        let raters: HashMap<Snowflake, User> = self
            .ctx
            .user_repo()
            .find_by_ids(&rater_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(reviews
            .iter()
            .map(|r| ReviewResponse::build(r, raters.get(&r.rater_id)))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn average(&self, ratee_id: Snowflake) -> ServiceResult<RatingResponse> {
        let summary = self.ctx.review_repo().summary(ratee_id).await?;
        Ok(RatingResponse::from(summary))
    }

    async fn require_user(&self, user_id: Snowflake) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?)
    }
}
