//! Ride entity <-> model mapper

use carpool_core::entities::{Ride, RideStatus};
use carpool_core::value_objects::Snowflake;

use crate::models::RideModel;

/// Convert RideModel to Ride entity.
///
/// The column is constrained to stored statuses; anything else reads as `Active`.
impl From<RideModel> for Ride {
    fn from(model: RideModel) -> Self {
        Ride {
            id: Snowflake::new(model.id),
            driver_id: Snowflake::new(model.driver_id),
            vehicle_id: Snowflake::new(model.vehicle_id),
            origin: model.origin,
            destination: model.destination,
            departure_time: model.departure_time,
            price: model.price,
            total_seats: model.total_seats,
            reserved_seats: model.reserved_seats,
            status: RideStatus::parse(&model.status).unwrap_or(RideStatus::Active),
            is_archived: model.is_archived,
            cancel_reason: model.cancel_reason,
            cancelled_at: model.cancelled_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
