//! Notification database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for notifications table
#[derive(Debug, Clone, FromRow)]
pub struct NotificationModel {
    pub id: i64,
    pub user_id: i64,
    pub sender_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub related_ride_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
