//! Reservation entity <-> model mapper

use carpool_core::entities::Reservation;
use carpool_core::value_objects::Snowflake;

use crate::models::ReservationModel;

impl From<ReservationModel> for Reservation {
    fn from(model: ReservationModel) -> Self {
        Reservation {
            id: Snowflake::new(model.id),
            ride_id: Snowflake::new(model.ride_id),
            passenger_id: Snowflake::new(model.passenger_id),
            reserved_at: model.reserved_at,
            is_confirmed: model.is_confirmed,
        }
    }
}
