//! PostgreSQL implementation of RideRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use carpool_core::entities::{cancellation_penalty, Notification, Ride, RideStatus};
use carpool_core::error::DomainError;
use carpool_core::traits::{
    NotificationFactory, RepoResult, RideCancellation, RideRepository, RideSearch, RideUpdate,
};
use carpool_core::value_objects::Snowflake;

use crate::models::RideModel;

use super::error::{map_db_error, map_fk_violation, ride_not_found, user_not_found};
use super::notification::insert_notification;

pub(super) const RIDE_COLUMNS: &str = "id, driver_id, vehicle_id, origin, destination, \
     departure_time, price, total_seats, reserved_seats, status, is_archived, cancel_reason, \
     cancelled_at, created_at, updated_at";

/// Lock a ride row for the rest of the transaction
pub(super) async fn lock_ride(conn: &mut PgConnection, id: Snowflake) -> RepoResult<RideModel> {
    sqlx::query_as::<_, RideModel>(&format!(
        "SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1 FOR UPDATE"
    ))
    .bind(id.into_inner())
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| ride_not_found(id))
}

/// Passenger ids holding a reservation on the ride, oldest booking first
pub(super) async fn passenger_ids(
    conn: &mut PgConnection,
    ride_id: Snowflake,
) -> RepoResult<Vec<Snowflake>> {
    let ids = sqlx::query_scalar::<_, i64>(
        r"
        SELECT passenger_id FROM reservations WHERE ride_id = $1 ORDER BY reserved_at, id
        ",
    )
    .bind(ride_id.into_inner())
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;

    Ok(ids.into_iter().map(Snowflake::new).collect())
}

/// PostgreSQL implementation of RideRepository
#[derive(Clone)]
pub struct PgRideRepository {
    pool: PgPool,
}

impl PgRideRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn notify_all(
        conn: &mut PgConnection,
        passengers: &[Snowflake],
        notify: NotificationFactory<'_>,
    ) -> RepoResult<Vec<Notification>> {
        let mut notifications = Vec::with_capacity(passengers.len());
        for passenger_id in passengers {
            let notification = notify(*passenger_id);
            insert_notification(conn, &notification).await?;
            notifications.push(notification);
        }
        Ok(notifications)
    }
}

#[async_trait]
impl RideRepository for PgRideRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Ride>> {
        let result = sqlx::query_as::<_, RideModel>(&format!(
            "SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Ride::from))
    }

    #[instrument(skip(self, ride), fields(ride_id = %ride.id))]
    async fn create(&self, ride: &Ride) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO rides (id, driver_id, vehicle_id, origin, destination, departure_time,
                               price, total_seats, reserved_seats, status, is_archived,
                               cancel_reason, cancelled_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ",
        )
        .bind(ride.id.into_inner())
        .bind(ride.driver_id.into_inner())
        .bind(ride.vehicle_id.into_inner())
        .bind(&ride.origin)
        .bind(&ride.destination)
        .bind(ride.departure_time)
        .bind(ride.price)
        .bind(ride.total_seats)
        .bind(ride.reserved_seats)
        .bind(ride.status.as_str())
        .bind(ride.is_archived)
        .bind(&ride.cancel_reason)
        .bind(ride.cancelled_at)
        .bind(ride.created_at)
        .bind(ride.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || user_not_found(ride.driver_id)))?;

        Ok(())
    }

    #[instrument(skip(self, update))]
    async fn update_details(&self, id: Snowflake, update: &RideUpdate) -> RepoResult<Ride> {
        // The passenger check is part of the write, so a reservation landing
        // between read and write cannot be overwritten
        let updated = sqlx::query_as::<_, RideModel>(&format!(
            r"
            UPDATE rides
            SET origin = $2, destination = $3, departure_time = $4, price = $5,
                total_seats = $6, updated_at = NOW()
            WHERE id = $1 AND reserved_seats = 0 AND status = 'active'
            RETURNING {RIDE_COLUMNS}
            "
        ))
        .bind(id.into_inner())
        .bind(&update.origin)
        .bind(&update.destination)
        .bind(update.departure_time)
        .bind(update.price)
        .bind(update.total_seats)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        if let Some(model) = updated {
            return Ok(Ride::from(model));
        }

        let current = self.find_by_id(id).await?.ok_or_else(|| ride_not_found(id))?;
        if current.status == RideStatus::Cancelled {
            Err(DomainError::RideUnavailable)
        } else {
            Err(DomainError::RideHasPassengers)
        }
    }

    #[instrument(skip(self))]
    async fn archive(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE rides SET is_archived = TRUE, updated_at = NOW() WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(ride_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &RideSearch) -> RepoResult<Vec<Ride>> {
        // strpos keeps user input free of LIKE wildcards
        let result = sqlx::query_as::<_, RideModel>(&format!(
            r"
            SELECT {RIDE_COLUMNS}
            FROM rides r
            WHERE NOT r.is_archived
              AND r.status <> 'cancelled'
              AND r.departure_time > $1
              AND ($2::TEXT IS NULL OR strpos(lower(r.origin), lower($2)) > 0)
              AND ($3::TEXT IS NULL OR strpos(lower(r.destination), lower($3)) > 0)
              AND ($4::BIGINT IS NULL OR (
                    r.driver_id <> $4
                    AND NOT EXISTS (
                        SELECT 1 FROM reservations res
                        WHERE res.ride_id = r.id AND res.passenger_id = $4
                    )
                  ))
            ORDER BY r.departure_time ASC
            "
        ))
        .bind(query.now)
        .bind(query.origin.as_deref())
        .bind(query.destination.as_deref())
        .bind(query.viewer.map(Snowflake::into_inner))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(Ride::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_for_driver(
        &self,
        driver_id: Snowflake,
        history: bool,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Ride>> {
        let sql = if history {
            format!(
                r"
                SELECT {RIDE_COLUMNS} FROM rides
                WHERE driver_id = $1 AND NOT is_archived
                  AND (status = 'cancelled' OR departure_time <= $2)
                ORDER BY departure_time DESC
                "
            )
        } else {
            format!(
                r"
                SELECT {RIDE_COLUMNS} FROM rides
                WHERE driver_id = $1 AND NOT is_archived
                  AND status <> 'cancelled' AND departure_time > $2
                ORDER BY departure_time ASC
                "
            )
        };

        let result = sqlx::query_as::<_, RideModel>(&sql)
            .bind(driver_id.into_inner())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.into_iter().map(Ride::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_for_passenger(&self, passenger_id: Snowflake) -> RepoResult<Vec<Ride>> {
        let result = sqlx::query_as::<_, RideModel>(
            r"
            SELECT r.id, r.driver_id, r.vehicle_id, r.origin, r.destination, r.departure_time,
                   r.price, r.total_seats, r.reserved_seats, r.status, r.is_archived,
                   r.cancel_reason, r.cancelled_at, r.created_at, r.updated_at
            FROM rides r
            INNER JOIN reservations res ON res.ride_id = r.id
            WHERE res.passenger_id = $1 AND res.is_confirmed
              AND r.status <> 'cancelled' AND NOT r.is_archived
            ORDER BY r.departure_time ASC
            ",
        )
        .bind(passenger_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(Ride::from).collect())
    }

    #[instrument(skip(self, notify))]
    async fn delete_with_reservations(
        &self,
        id: Snowflake,
        notify: NotificationFactory<'_>,
    ) -> RepoResult<Vec<Notification>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        lock_ride(&mut tx, id).await?;
        let passengers = passenger_ids(&mut tx, id).await?;
        let notifications = Self::notify_all(&mut tx, &passengers, notify).await?;

        sqlx::query("DELETE FROM reservations WHERE ride_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("DELETE FROM rides WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(ride_id = %id, passengers = passengers.len(), "Ride deleted");
        Ok(notifications)
    }

    #[instrument(skip(self, notify))]
    async fn cancel(
        &self,
        id: Snowflake,
        reason: &str,
        now: DateTime<Utc>,
        notify: NotificationFactory<'_>,
    ) -> RepoResult<RideCancellation> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let ride = lock_ride(&mut tx, id).await?;
        if ride.status == RideStatus::Cancelled.as_str() {
            return Err(DomainError::RideAlreadyCancelled);
        }

        let passengers = passenger_ids(&mut tx, id).await?;
        let penalty = if passengers.is_empty() {
            0.0
        } else {
            cancellation_penalty(ride.departure_time, now)
        };

        let driver_reputation = sqlx::query_scalar::<_, f64>(
            r"
            UPDATE users SET reputation = GREATEST(reputation - $2, 0)
            WHERE id = $1
            RETURNING reputation
            ",
        )
        .bind(ride.driver_id)
        .bind(penalty)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let notifications = Self::notify_all(&mut tx, &passengers, notify).await?;

        let cancelled = sqlx::query_as::<_, RideModel>(&format!(
            r"
            UPDATE rides
            SET status = 'cancelled', cancel_reason = $2, cancelled_at = $3, updated_at = $3
            WHERE id = $1
            RETURNING {RIDE_COLUMNS}
            "
        ))
        .bind(id.into_inner())
        .bind(reason)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(RideCancellation {
            ride: Ride::from(cancelled),
            penalty,
            driver_reputation,
            notifications,
        })
    }
}
