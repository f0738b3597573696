//! Chat over the socket (op 2 SendMessage, op 3 MarkRead)

use std::sync::Arc;

use carpool_service::dto::SendMessageRequest;
use carpool_service::{ChatService, ServiceError};
use validator::Validate;

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::{CloseCode, MarkReadPayload, SendMessagePayload};
use crate::server::GatewayState;

pub struct ChatHandler;

impl ChatHandler {
    /// Send a message as the connected user
    pub async fn send_message(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: SendMessagePayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let request = SendMessageRequest {
            receiver_id: payload.receiver_id,
            content: payload.content,
        };
        request.validate().map_err(ServiceError::from)?;

        let message = ChatService::new(state.service_context())
            .send(connection.user_id(), &request)
            .await?;

        tracing::debug!(
            session_id = %connection.session_id(),
            message_id = %message.id,
            "Message sent over gateway"
        );
        Ok(None)
    }

    /// Mark the conversation with `payload.user_id` read for the connected user
    pub async fn mark_read(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: MarkReadPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let read = ChatService::new(state.service_context())
            .mark_read(connection.user_id(), payload.user_id)
            .await?;

        tracing::debug!(
            session_id = %connection.session_id(),
            other_id = %payload.user_id,
            count = read.count,
            "Conversation marked read"
        );
        Ok(None)
    }
}
