//! Heartbeat handler (op 1)

use std::sync::Arc;

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage};

/// Handles heartbeat messages
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Reset the session's heartbeat clock and acknowledge
    pub fn handle(connection: &Arc<Connection>) -> HandlerResult<Option<CloseCode>> {
        connection.record_heartbeat();

        tracing::trace!(session_id = %connection.session_id(), "Heartbeat received");

        if let Err(e) = connection.try_send(GatewayMessage::heartbeat_ack()) {
            tracing::warn!(
                session_id = %connection.session_id(),
                error = %e,
                "Failed to send heartbeat ACK"
            );
            return Err(HandlerError::Internal("Failed to send heartbeat ACK".to_string()));
        }

        Ok(None)
    }
}
