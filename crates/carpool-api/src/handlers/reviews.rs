//! Review handlers

use axum::{extract::State, Json};
use carpool_core::Snowflake;
use carpool_service::dto::{CreateReviewRequest, RatingResponse, ReviewResponse};
use carpool_service::ReviewService;

use crate::extractors::{AuthUser, SnowflakePath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// POST /reviews
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateReviewRequest>,
) -> ApiResult<Created<Json<ReviewResponse>>> {
    let service = ReviewService::new(state.service_context());
    let review = service.create(auth.user_id, &request).await?;
    Ok(Created(Json(review)))
}

/// GET /reviews/users/{user_id}
pub async fn list_reviews(
    State(state): State<AppState>,
    SnowflakePath(user_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<Vec<ReviewResponse>>> {
    let service = ReviewService::new(state.service_context());
    Ok(Json(service.list(user_id).await?))
}

/// GET /reviews/users/{user_id}/average
pub async fn average_rating(
    State(state): State<AppState>,
    SnowflakePath(user_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<RatingResponse>> {
    let service = ReviewService::new(state.service_context());
    Ok(Json(service.average(user_id).await?))
}
