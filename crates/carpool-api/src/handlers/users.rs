//! User handlers

use axum::{extract::State, Json};
use carpool_core::Snowflake;
use carpool_service::dto::{CurrentUserResponse, ProfileResponse};
use carpool_service::UserService;

use crate::extractors::{AuthUser, SnowflakePath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Get current user
///
/// GET /users/@me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.me(auth.user_id).await?;
    Ok(Json(response))
}

/// Public profile with vehicle, rating and presence
///
/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    SnowflakePath(user_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<ProfileResponse>> {
    let service = UserService::new(state.service_context());
    let response = service.profile(user_id).await?;
    Ok(Json(response))
}
