//! Individual WebSocket connection

use std::sync::Arc;
use std::time::{Duration, Instant};

use carpool_core::Snowflake;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::protocol::{CloseCode, GatewayMessage};

/// What the writer task sends next
#[derive(Debug, Clone)]
pub enum Outbound {
    Frame(GatewayMessage),
    Close(CloseCode),
}

/// One authenticated WebSocket session
pub struct Connection {
    session_id: String,
    user_id: Snowflake,

    /// Queue drained by the socket writer
    sender: mpsc::Sender<Outbound>,

    last_heartbeat: Mutex<Instant>,
    created_at: Instant,
}

impl Connection {
    pub fn new(session_id: String, user_id: Snowflake, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            user_id,
            sender,
            last_heartbeat: Mutex::new(Instant::now()),
            created_at: Instant::now(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    pub fn record_heartbeat(&self) {
        *self.last_heartbeat.lock() = Instant::now();
    }

    pub fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.lock().elapsed()
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue a frame without waiting. Fails when the queue is full or the writer is gone.
    pub fn try_send(&self, message: GatewayMessage) -> Result<(), mpsc::error::TrySendError<Outbound>> {
        self.sender.try_send(Outbound::Frame(message))
    }

    /// Ask the writer to close the socket with `code`
    pub fn close(&self, code: CloseCode) {
        if self.sender.try_send(Outbound::Close(code)).is_err() {
            tracing::debug!(session_id = %self.session_id, "Writer already gone, close skipped");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("age", &self.created_at.elapsed())
            .finish()
    }
}
