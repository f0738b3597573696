//! Chat handlers
//!
//! The REST side of direct messaging; the gateway offers the same send and
//! mark-read operations over the socket.

use axum::{extract::State, Json};
use carpool_core::Snowflake;
use carpool_service::dto::{ContactResponse, CountResponse, MessageResponse, SendMessageRequest};
use carpool_service::ChatService;

use crate::extractors::{AuthUser, SnowflakePath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// POST /chat/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = ChatService::new(state.service_context());
    let message = service.send(auth.user_id, &request).await?;
    Ok(Created(Json(message)))
}

/// Conversation with one user, oldest first
///
/// GET /chat/history/{user_id}
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(other_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = ChatService::new(state.service_context());
    Ok(Json(service.history(auth.user_id, other_id).await?))
}

/// POST /chat/history/{user_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(other_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<CountResponse>> {
    let service = ChatService::new(state.service_context());
    Ok(Json(service.mark_read(auth.user_id, other_id).await?))
}

/// GET /chat/contacts
pub async fn contacts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ContactResponse>>> {
    let service = ChatService::new(state.service_context());
    Ok(Json(service.contacts(auth.user_id).await?))
}

/// Contact card for someone the caller has not talked to yet
///
/// GET /chat/contacts/{user_id}
pub async fn contact(
    State(state): State<AppState>,
    _auth: AuthUser,
    SnowflakePath(user_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<ContactResponse>> {
    let service = ChatService::new(state.service_context());
    Ok(Json(service.contact(user_id).await?))
}
