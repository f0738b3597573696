//! Reservation entity - one passenger's claim on one seat

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Only created through the seat-reservation protocol; at most one per (ride, passenger)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Snowflake,
    pub ride_id: Snowflake,
    pub passenger_id: Snowflake,
    pub reserved_at: DateTime<Utc>,
    pub is_confirmed: bool,
}

impl Reservation {
    pub fn new(id: Snowflake, ride_id: Snowflake, passenger_id: Snowflake) -> Self {
        Self {
            id,
            ride_id,
            passenger_id,
            reserved_at: Utc::now(),
            is_confirmed: true,
        }
    }
}
