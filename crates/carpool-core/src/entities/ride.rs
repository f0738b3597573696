//! Ride entity - a driver-posted trip with fixed seat capacity
//!
//! Seat bookkeeping rules:
//! - `0 <= reserved_seats <= total_seats`
//! - `reserved_seats` equals the number of reservation rows for the ride
//! - `HasPassengers` iff `reserved_seats > 0`, unless the ride was cancelled
//!
//! `Completed` is never stored; it is derived from the departure time when read.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Lifecycle status of a ride
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RideStatus {
    Active,
    HasPassengers,
    Cancelled,
    Completed,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::HasPassengers => "has_passengers",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "has_passengers" => Some(Self::HasPassengers),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Cancelled and completed rides are closed for booking and editing
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

/// Reputation penalty for a driver cancelling a ride that has passengers.
///
/// Under two hours before departure costs 20 points, under a day costs 1,
/// anything earlier is free. A departure already in the past counts as under two hours.
pub fn cancellation_penalty(departure_time: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let until_departure = departure_time - now;
    if until_departure < Duration::hours(2) {
        20.0
    } else if until_departure < Duration::hours(24) {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    pub id: Snowflake,
    pub driver_id: Snowflake,
    pub vehicle_id: Snowflake,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub price: f64,
    pub total_seats: i32,
    pub reserved_seats: i32,
    pub status: RideStatus,
    pub is_archived: bool,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ride {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Snowflake,
        driver_id: Snowflake,
        vehicle_id: Snowflake,
        origin: String,
        destination: String,
        departure_time: DateTime<Utc>,
        price: f64,
        total_seats: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            driver_id,
            vehicle_id,
            origin,
            destination,
            departure_time,
            price,
            total_seats,
            reserved_seats: 0,
            status: RideStatus::Active,
            is_archived: false,
            cancel_reason: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn available_seats(&self) -> i32 {
        (self.total_seats - self.reserved_seats).max(0)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.reserved_seats >= self.total_seats
    }

    #[inline]
    pub fn is_driver(&self, user_id: Snowflake) -> bool {
        self.driver_id == user_id
    }

    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        self.departure_time <= now
    }

    /// Status as seen by readers: open rides whose departure passed are `Completed`
    pub fn effective_status(&self, now: DateTime<Utc>) -> RideStatus {
        match self.status {
            RideStatus::Active | RideStatus::HasPassengers if self.has_departed(now) => {
                RideStatus::Completed
            }
            status => status,
        }
    }

    /// Whether a passenger may still take a seat (capacity aside)
    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        !self.is_archived && !self.effective_status(now).is_closed()
    }

    /// Details may only change while nobody holds a seat
    pub fn is_editable(&self) -> bool {
        self.reserved_seats == 0 && self.status == RideStatus::Active
    }

    /// Take one seat. Returns `false` without changing anything when the ride is full.
    pub fn try_reserve_seat(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.reserved_seats += 1;
        if self.status == RideStatus::Active {
            self.status = RideStatus::HasPassengers;
        }
        self.updated_at = Utc::now();
        true
    }

    /// Give one seat back, flooring at zero; reverts to `Active` when the last passenger leaves
    pub fn release_seat(&mut self) {
        self.reserved_seats = (self.reserved_seats - 1).max(0);
        if self.reserved_seats == 0 && self.status == RideStatus::HasPassengers {
            self.status = RideStatus::Active;
        }
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self, reason: String, now: DateTime<Utc>) {
        self.status = RideStatus::Cancelled;
        self.cancel_reason = Some(reason);
        self.cancelled_at = Some(now);
        self.updated_at = now;
    }

    pub fn archive(&mut self) {
        self.is_archived = true;
        self.updated_at = Utc::now();
    }
}
