//! Vehicle entity <-> model mapper

use carpool_core::entities::Vehicle;
use carpool_core::value_objects::Snowflake;

use crate::models::VehicleModel;

impl From<VehicleModel> for Vehicle {
    fn from(model: VehicleModel) -> Self {
        Vehicle {
            id: Snowflake::new(model.id),
            owner_id: Snowflake::new(model.owner_id),
            plate_number: model.plate_number,
            model: model.model,
            color: model.color,
            is_deleted: model.is_deleted,
        }
    }
}
