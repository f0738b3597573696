//! Message entity - a point-to-point chat message

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Append-only apart from `is_read`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl Message {
    pub fn new(id: Snowflake, sender_id: Snowflake, receiver_id: Snowflake, content: String) -> Self {
        Self {
            id,
            sender_id,
            receiver_id,
            content,
            timestamp: Utc::now(),
            is_read: false,
        }
    }

    /// Whether the message belongs to the conversation between `a` and `b`
    pub fn is_between(&self, a: Snowflake, b: Snowflake) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    /// The other participant from `user_id`'s point of view
    pub fn counterpart(&self, user_id: Snowflake) -> Snowflake {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}
