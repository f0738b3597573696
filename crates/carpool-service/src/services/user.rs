//! User service

use carpool_core::{DomainError, Snowflake, User};
use tracing::instrument;

use crate::dto::{CurrentUserResponse, ProfileResponse, PublicUserResponse, RatingResponse, VehicleResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The caller's own account, contact details included
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Snowflake) -> ServiceResult<CurrentUserResponse> {
        let user = self.require_user(user_id).await?;
        Ok(CurrentUserResponse::from(&user))
    }

    /// Public profile: vehicle, rating and presence, never email or phone
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Snowflake) -> ServiceResult<ProfileResponse> {
        let user = self.require_user(user_id).await?;
        let vehicle = self.ctx.vehicle_repo().find_active_by_owner(user_id).await?;
        let rating = self.ctx.review_repo().summary(user_id).await?;

        let mut public = PublicUserResponse::from(&user);
        // A live session is fresher than the stored flag
        public.is_online = public.is_online || self.ctx.live().is_online(user_id);

        Ok(ProfileResponse {
            user: public,
            vehicle: vehicle.as_ref().map(VehicleResponse::from),
            rating: RatingResponse::from(rating),
        })
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
