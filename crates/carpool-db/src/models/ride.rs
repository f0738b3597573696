//! Ride database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for rides table
#[derive(Debug, Clone, FromRow)]
pub struct RideModel {
    pub id: i64,
    pub driver_id: i64,
    pub vehicle_id: i64,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub price: f64,
    pub total_seats: i32,
    pub reserved_seats: i32,
    pub status: String,
    pub is_archived: bool,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
