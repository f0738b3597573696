//! Gateway message format

use carpool_core::DomainEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{HelloPayload, MarkReadPayload, OpCode, SendMessagePayload};

/// Every frame on the socket is `{op, t?, d?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event name (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Event data payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    // === Server Messages ===

    /// Wrap a domain event as a Dispatch frame (op=0)
    #[must_use]
    pub fn dispatch(event: &DomainEvent) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event.event_type().to_string()),
            d: Some(event.payload()),
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self {
            op: OpCode::Hello,
            t: None,
            d: serde_json::to_value(payload).ok(),
        }
    }

    /// Create a Heartbeat ACK message (op=11)
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self {
            op: OpCode::HeartbeatAck,
            t: None,
            d: None,
        }
    }

    // === Parsing Client Messages ===

    /// Try to parse as a SendMessage payload (op=2)
    pub fn as_send_message(&self) -> Option<SendMessagePayload> {
        if self.op != OpCode::SendMessage {
            return None;
        }
        self.d.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Try to parse as a MarkRead payload (op=3)
    pub fn as_mark_read(&self) -> Option<MarkReadPayload> {
        if self.op != OpCode::MarkRead {
            return None;
        }
        self.d.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.t {
            Some(t) => write!(f, "GatewayMessage(op={}, t={t})", self.op),
            None => write!(f, "GatewayMessage(op={})", self.op),
        }
    }
}
