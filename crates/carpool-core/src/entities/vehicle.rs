//! Vehicle entity - the car a driver offers seats in

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub plate_number: String,
    pub model: String,
    pub color: String,
    pub is_deleted: bool,
}

impl Vehicle {
    pub const PLACEHOLDER_PLATE: &'static str = "10 DEMO 01";
    pub const PLACEHOLDER_MODEL: &'static str = "Unspecified";
    pub const PLACEHOLDER_COLOR: &'static str = "White";

    pub fn new(
        id: Snowflake,
        owner_id: Snowflake,
        plate_number: String,
        model: String,
        color: String,
    ) -> Self {
        Self {
            id,
            owner_id,
            plate_number,
            model,
            color,
            is_deleted: false,
        }
    }

    /// Vehicle provisioned for a driver who posts a ride before registering a car
    pub fn placeholder(id: Snowflake, owner_id: Snowflake) -> Self {
        Self::new(
            id,
            owner_id,
            Self::PLACEHOLDER_PLATE.to_string(),
            Self::PLACEHOLDER_MODEL.to_string(),
            Self::PLACEHOLDER_COLOR.to_string(),
        )
    }
}
