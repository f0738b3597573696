//! Domain events - what live connections hear about
//!
//! Each variant is delivered as a named dispatch on the push channel:
//! - `ReceiveMessage` to the receiver of a chat message
//! - `UserStatusChanged` to everyone when a user goes online or offline
//! - `ReceiveNotification` to the recipient of any persisted notification
//! - `ReceiveBookingNotification` / `ReceiveCancellationNotification` as short
//!   text companions of reservation and cancellation notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Message, Notification, NotificationType};
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    ReceiveMessage(MessageEvent),
    UserStatusChanged(UserStatusChangedEvent),
    ReceiveBookingNotification(String),
    ReceiveCancellationNotification(String),
    ReceiveNotification(NotificationEvent),
}

impl DomainEvent {
    /// Event name used as the dispatch type on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ReceiveMessage(_) => "ReceiveMessage",
            Self::UserStatusChanged(_) => "UserStatusChanged",
            Self::ReceiveBookingNotification(_) => "ReceiveBookingNotification",
            Self::ReceiveCancellationNotification(_) => "ReceiveCancellationNotification",
            Self::ReceiveNotification(_) => "ReceiveNotification",
        }
    }

    /// JSON body of the dispatch
    pub fn payload(&self) -> serde_json::Value {
        let value = match self {
            Self::ReceiveMessage(e) => serde_json::to_value(e),
            Self::UserStatusChanged(e) => serde_json::to_value(e),
            Self::ReceiveBookingNotification(text)
            | Self::ReceiveCancellationNotification(text) => {
                return serde_json::Value::String(text.clone())
            }
            Self::ReceiveNotification(e) => serde_json::to_value(e),
        };
        value.unwrap_or(serde_json::Value::Null)
    }

    pub fn user_status(user_id: Snowflake, is_online: bool, timestamp: DateTime<Utc>) -> Self {
        Self::UserStatusChanged(UserStatusChangedEvent {
            user_id,
            is_online,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl From<&Message> for MessageEvent {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            content: m.content.clone(),
            timestamp: m.timestamp,
            is_read: m.is_read,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusChangedEvent {
    pub user_id: Snowflake,
    pub is_online: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: Snowflake,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub is_read: bool,
    pub ride_id: Option<Snowflake>,
    pub sender_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationEvent {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            title: n.title.clone(),
            message: n.message.clone(),
            kind: n.kind,
            is_read: n.is_read,
            ride_id: n.related_ride_id,
            sender_id: n.sender_id,
            created_at: n.created_at,
        }
    }
}
