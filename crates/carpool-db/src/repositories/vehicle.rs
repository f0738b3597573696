//! PostgreSQL implementation of VehicleRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use carpool_core::entities::Vehicle;
use carpool_core::traits::{RepoResult, VehicleRepository};
use carpool_core::value_objects::Snowflake;

use crate::models::VehicleModel;

use super::error::{map_db_error, map_fk_violation, raw_ids, user_not_found};

/// PostgreSQL implementation of VehicleRepository
#[derive(Clone)]
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    #[instrument(skip(self))]
    async fn find_active_by_owner(&self, owner_id: Snowflake) -> RepoResult<Option<Vehicle>> {
        let result = sqlx::query_as::<_, VehicleModel>(
            r"
            SELECT id, owner_id, plate_number, model, color, is_deleted
            FROM vehicles
            WHERE owner_id = $1 AND NOT is_deleted
            ",
        )
        .bind(owner_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Vehicle::from))
    }

    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Vehicle>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = sqlx::query_as::<_, VehicleModel>(
            r"
            SELECT id, owner_id, plate_number, model, color, is_deleted
            FROM vehicles
            WHERE id = ANY($1)
            ",
        )
        .bind(raw_ids(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(Vehicle::from).collect())
    }

    #[instrument(skip(self))]
    async fn create(&self, vehicle: &Vehicle) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO vehicles (id, owner_id, plate_number, model, color, is_deleted)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(vehicle.id.into_inner())
        .bind(vehicle.owner_id.into_inner())
        .bind(&vehicle.plate_number)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(vehicle.is_deleted)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || user_not_found(vehicle.owner_id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn ensure_for_owner(&self, fallback: &Vehicle) -> RepoResult<Vehicle> {
        // The partial unique index on live vehicles turns a concurrent insert into a no-op
        let inserted = sqlx::query_as::<_, VehicleModel>(
            r"
            INSERT INTO vehicles (id, owner_id, plate_number, model, color, is_deleted)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            ON CONFLICT (owner_id) WHERE NOT is_deleted DO NOTHING
            RETURNING id, owner_id, plate_number, model, color, is_deleted
            ",
        )
        .bind(fallback.id.into_inner())
        .bind(fallback.owner_id.into_inner())
        .bind(&fallback.plate_number)
        .bind(&fallback.model)
        .bind(&fallback.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || user_not_found(fallback.owner_id)))?;

        if let Some(model) = inserted {
            return Ok(Vehicle::from(model));
        }

        self.find_active_by_owner(fallback.owner_id)
            .await?
            .ok_or_else(|| user_not_found(fallback.owner_id))
    }
}
