//! Op code handlers
//!
//! Handles incoming WebSocket messages based on their operation code.

mod chat;
mod error;
mod heartbeat;

pub use chat::ChatHandler;
pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;

use std::sync::Arc;

use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use crate::server::GatewayState;

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming client message
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if !message.op.is_client_op() {
            tracing::warn!(
                session_id = %connection.session_id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        match message.op {
            OpCode::Heartbeat => HeartbeatHandler::handle(connection),
            OpCode::SendMessage => {
                let payload = message.as_send_message().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid SendMessage payload".to_string())
                })?;

                ChatHandler::send_message(state, connection, payload).await
            }
            OpCode::MarkRead => {
                let payload = message.as_mark_read().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid MarkRead payload".to_string())
                })?;

                ChatHandler::mark_read(state, connection, payload).await
            }
            _ => {
                tracing::error!(op = %message.op, "Unhandled client op code");
                Ok(Some(CloseCode::UnknownOpcode))
            }
        }
    }
}
