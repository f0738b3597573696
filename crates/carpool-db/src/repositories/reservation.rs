//! PostgreSQL implementation of ReservationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use carpool_core::entities::{Notification, Reservation, Ride};
use carpool_core::error::DomainError;
use carpool_core::traits::{RepoResult, ReservationRepository};
use carpool_core::value_objects::Snowflake;

use crate::models::{ReservationModel, RideModel};

use super::error::{map_db_error, ride_not_found, user_not_found};
use super::notification::insert_notification;
use super::ride::{lock_ride, RIDE_COLUMNS};

/// PostgreSQL implementation of ReservationRepository
#[derive(Clone)]
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        ride_id: Snowflake,
        passenger_id: Snowflake,
    ) -> RepoResult<Option<Reservation>> {
        let result = sqlx::query_as::<_, ReservationModel>(
            r"
            SELECT id, ride_id, passenger_id, reserved_at, is_confirmed
            FROM reservations
            WHERE ride_id = $1 AND passenger_id = $2
            ",
        )
        .bind(ride_id.into_inner())
        .bind(passenger_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Reservation::from))
    }

    #[instrument(skip(self))]
    async fn find_by_ride(&self, ride_id: Snowflake) -> RepoResult<Vec<Reservation>> {
        let result = sqlx::query_as::<_, ReservationModel>(
            r"
            SELECT id, ride_id, passenger_id, reserved_at, is_confirmed
            FROM reservations
            WHERE ride_id = $1
            ORDER BY reserved_at, id
            ",
        )
        .bind(ride_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(Reservation::from).collect())
    }

    #[instrument(
        skip(self, reservation, driver_notification),
        fields(ride_id = %reservation.ride_id, passenger_id = %reservation.passenger_id)
    )]
    async fn reserve_seat(
        &self,
        reservation: &Reservation,
        driver_notification: &Notification,
        now: DateTime<Utc>,
    ) -> RepoResult<Ride> {
        let ride_id = reservation.ride_id;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let duplicate = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM reservations WHERE ride_id = $1 AND passenger_id = $2)
            ",
        )
        .bind(ride_id.into_inner())
        .bind(reservation.passenger_id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if duplicate {
            return Err(DomainError::AlreadyReserved);
        }

        // Conditional decrement of free seats. Concurrent callers queue on the
        // row lock and re-check the predicate against the committed count.
        let taken = sqlx::query_as::<_, RideModel>(&format!(
            r"
            UPDATE rides
            SET reserved_seats = reserved_seats + 1,
                status = CASE WHEN status = 'active' THEN 'has_passengers' ELSE status END,
                updated_at = $2
            WHERE id = $1
              AND reserved_seats < total_seats
              AND status <> 'cancelled'
              AND NOT is_archived
              AND departure_time > $2
            RETURNING {RIDE_COLUMNS}
            "
        ))
        .bind(ride_id.into_inner())
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some(ride) = taken else {
            let current = sqlx::query_as::<_, RideModel>(&format!(
                "SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1"
            ))
            .bind(ride_id.into_inner())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?
            .map(Ride::from)
            .ok_or_else(|| ride_not_found(ride_id))?;

            return Err(if current.is_bookable(now) {
                DomainError::RideFull
            } else {
                DomainError::RideUnavailable
            });
        };

        sqlx::query(
            r"
            INSERT INTO reservations (id, ride_id, passenger_id, reserved_at, is_confirmed)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(reservation.id.into_inner())
        .bind(ride_id.into_inner())
        .bind(reservation.passenger_id.into_inner())
        .bind(reservation.reserved_at)
        .bind(reservation.is_confirmed)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let (unique, missing_ref) = e.as_database_error().map_or((false, false), |db| {
                (db.is_unique_violation(), db.is_foreign_key_violation())
            });
            if unique {
                DomainError::AlreadyReserved
            } else if missing_ref {
                user_not_found(reservation.passenger_id)
            } else {
                map_db_error(e)
            }
        })?;

        insert_notification(&mut tx, driver_notification).await?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(reserved_seats = ride.reserved_seats, "Seat reserved");
        Ok(Ride::from(ride))
    }

    #[instrument(skip(self, driver_notification))]
    async fn cancel_reservation(
        &self,
        ride_id: Snowflake,
        passenger_id: Snowflake,
        driver_notification: &Notification,
    ) -> RepoResult<Ride> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Ride row first, same order as delete and cancel
        lock_ride(&mut tx, ride_id).await?;

        let removed = sqlx::query_scalar::<_, i64>(
            r"
            DELETE FROM reservations WHERE ride_id = $1 AND passenger_id = $2 RETURNING id
            ",
        )
        .bind(ride_id.into_inner())
        .bind(passenger_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if removed.is_none() {
            return Err(DomainError::ReservationNotFound(ride_id));
        }

        let ride = sqlx::query_as::<_, RideModel>(&format!(
            r"
            UPDATE rides
            SET reserved_seats = GREATEST(reserved_seats - 1, 0),
                status = CASE
                    WHEN status = 'has_passengers' AND reserved_seats <= 1 THEN 'active'
                    ELSE status
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {RIDE_COLUMNS}
            "
        ))
        .bind(ride_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| ride_not_found(ride_id))?;

        insert_notification(&mut tx, driver_notification).await?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(Ride::from(ride))
    }
}
