//! Reservation database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reservations table
#[derive(Debug, Clone, FromRow)]
pub struct ReservationModel {
    pub id: i64,
    pub ride_id: i64,
    pub passenger_id: i64,
    pub reserved_at: DateTime<Utc>,
    pub is_confirmed: bool,
}
