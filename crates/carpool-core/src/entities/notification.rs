//! Notification entity - a persisted message for one recipient

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Closed set of notification severities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Warning,
    Error,
    #[default]
    Info,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub sender_id: Option<Snowflake>,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub related_ride_id: Option<Snowflake>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationType,
    ) -> Self {
        Self {
            id,
            user_id,
            sender_id: None,
            title: title.into(),
            message: message.into(),
            kind,
            related_ride_id: None,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn from_sender(mut self, sender_id: Snowflake) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    #[must_use]
    pub fn for_ride(mut self, ride_id: Snowflake) -> Self {
        self.related_ride_id = Some(ride_id);
        self
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.user_id == user_id
    }
}
