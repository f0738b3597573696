//! Vehicle database model

use sqlx::FromRow;

/// Database model for vehicles table
#[derive(Debug, Clone, FromRow)]
pub struct VehicleModel {
    pub id: i64,
    pub owner_id: i64,
    pub plate_number: String,
    pub model: String,
    pub color: String,
    pub is_deleted: bool,
}
