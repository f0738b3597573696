//! Notification handlers
//!
//! Every operation is scoped to the caller's own notifications.

use axum::{extract::State, Json};
use carpool_core::Snowflake;
use carpool_service::dto::{
    BulkDeleteNotificationsRequest, CountResponse, ListNotificationsQuery, NotificationResponse,
    UnreadCountResponse,
};
use carpool_service::NotificationService;

use crate::extractors::{AuthUser, SnowflakePath, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// GET /notifications?unread_only&limit&offset
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<ListNotificationsQuery>,
) -> ApiResult<Json<Vec<NotificationResponse>>> {
    let service = NotificationService::new(state.service_context());
    let notifications = service.list(auth.user_id, &query).await?;
    Ok(Json(notifications))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.service_context());
    Ok(Json(service.unread_count(auth.user_id).await?))
}

/// POST /notifications/{notification_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(notification_id): SnowflakePath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = NotificationService::new(state.service_context());
    service.mark_read(auth.user_id, notification_id).await?;
    Ok(NoContent)
}

/// POST /notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CountResponse>> {
    let service = NotificationService::new(state.service_context());
    Ok(Json(service.mark_all_read(auth.user_id).await?))
}

/// DELETE /notifications/{notification_id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(notification_id): SnowflakePath<Snowflake>,
) -> ApiResult<NoContent> {
    let service = NotificationService::new(state.service_context());
    service.delete(auth.user_id, notification_id).await?;
    Ok(NoContent)
}

/// POST /notifications/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<BulkDeleteNotificationsRequest>,
) -> ApiResult<Json<CountResponse>> {
    let service = NotificationService::new(state.service_context());
    Ok(Json(service.bulk_delete(auth.user_id, &request).await?))
}

/// DELETE /notifications
pub async fn delete_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CountResponse>> {
    let service = NotificationService::new(state.service_context());
    Ok(Json(service.delete_all(auth.user_id).await?))
}
