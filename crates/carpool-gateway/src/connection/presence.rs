//! Presence transitions
//!
//! Only the 0 to 1 and 1 to 0 edges of a user's live session count matter to
//! the rest of the system. The registry detects those edges under its per-user
//! entry lock and stamps each with a sequence number from here, so the durable
//! writes can be ordered even when they land out of order.

use std::sync::atomic::{AtomicI64, Ordering};

use carpool_core::Snowflake;
use chrono::Utc;

/// A user going online or offline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceTransition {
    pub user_id: Snowflake,
    pub is_online: bool,
    pub seq: i64,
}

/// Source of presence sequence numbers
pub struct PresenceSequence {
    seq: AtomicI64,
}

impl PresenceSequence {
    /// Starts at the current time in microseconds so numbers keep growing
    /// across restarts.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Utc::now().timestamp_micros())
    }

    #[must_use]
    pub fn starting_at(seq: i64) -> Self {
        Self {
            seq: AtomicI64::new(seq),
        }
    }

    /// Stamp a transition with the next number
    pub fn stamp(&self, user_id: Snowflake, is_online: bool) -> PresenceTransition {
        PresenceTransition {
            user_id,
            is_online,
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    pub fn current(&self) -> i64 {
        self.seq.load(Ordering::SeqCst)
    }
}

impl Default for PresenceSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PresenceSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceSequence")
            .field("seq", &self.current())
            .finish()
    }
}
