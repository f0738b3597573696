//! Ride lifecycle engine
//!
//! Posting, searching, reserving, editing, archiving, cancelling and deleting
//! rides. Every multi-row change is a single repository call so the seat
//! counter, the reservation ledger and the notifications commit together;
//! live pushes happen only after that commit.

use std::collections::HashMap;

use carpool_core::entities::{Notification, NotificationType, Reservation, Ride, User, Vehicle};
use carpool_core::traits::{RideSearch, RideUpdate};
use carpool_core::{DomainError, Snowflake};
use chrono::Utc;
use tracing::{info, instrument};

use crate::dto::{
    CancelRideRequest, CancelRideResponse, DeleteRideResponse, RideDetailsRequest, RideResponse,
    SearchRidesQuery,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::notification::{Companion, NotificationService};

/// Ride service
pub struct RideService<'a> {
    ctx: &'a ServiceContext,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl<'a> RideService<'a> {
    /// Create a new RideService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post a ride. A driver without a vehicle gets a placeholder one.
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        driver_id: Snowflake,
        request: RideDetailsRequest,
    ) -> ServiceResult<RideResponse> {
        let driver = self.require_user(driver_id).await?;

        let vehicle = self
            .ctx
            .vehicle_repo()
            .ensure_for_owner(&Vehicle::placeholder(self.ctx.generate_id(), driver_id))
            .await?;

        let ride = Ride::new(
            self.ctx.generate_id(),
            driver_id,
            vehicle.id,
            request.origin.trim().to_string(),
            request.destination.trim().to_string(),
            request.departure_time,
            request.price,
            request.total_seats,
        );
        self.ctx.ride_repo().create(&ride).await?;

        info!(ride_id = %ride.id, driver_id = %driver_id, seats = ride.total_seats, "Ride created");

        Ok(RideResponse::build(&ride, Some(&driver), Some(&vehicle), Utc::now()))
    }

    /// Open future rides, leaving out the viewer's own and already booked ones
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        viewer: Option<Snowflake>,
        query: &SearchRidesQuery,
    ) -> ServiceResult<Vec<RideResponse>> {
        let search = RideSearch {
            origin: non_blank(query.origin.as_ref()),
            destination: non_blank(query.destination.as_ref()),
            viewer,
            now: Utc::now(),
        };
        let rides = self.ctx.ride_repo().search(&search).await?;
        self.responses(&rides).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, ride_id: Snowflake) -> ServiceResult<RideResponse> {
        let ride = self.require_ride(ride_id).await?;
        self.response(&ride).await
    }

    /// Reserve one seat for the passenger and notify the driver
    #[instrument(skip(self))]
    pub async fn reserve(
        &self,
        ride_id: Snowflake,
        passenger_id: Snowflake,
    ) -> ServiceResult<RideResponse> {
        let ride = self.require_ride(ride_id).await?;
        if ride.is_driver(passenger_id) {
            return Err(DomainError::CannotReserveOwnRide.into());
        }
        let passenger = self.require_user(passenger_id).await?;

        let notification = Notification::new(
            self.ctx.generate_id(),
            ride.driver_id,
            "New reservation",
            format!(
                "{} reserved a seat on your ride from {} to {}",
                passenger.first_name, ride.origin, ride.destination
            ),
            NotificationType::Success,
        )
        .from_sender(passenger_id)
        .for_ride(ride_id);

        let reservation = Reservation::new(self.ctx.generate_id(), ride_id, passenger_id);
        let ride = self
            .ctx
            .reservation_repo()
            .reserve_seat(&reservation, &notification, Utc::now())
            .await?;

        info!(
            ride_id = %ride_id,
            passenger_id = %passenger_id,
            reserved = ride.reserved_seats,
            total = ride.total_seats,
            "Seat reserved"
        );

        NotificationService::new(self.ctx).push(&notification, Companion::Booking);
        self.response(&ride).await
    }

    /// Give the passenger's seat back and notify the driver
    #[instrument(skip(self))]
    pub async fn cancel_reservation(
        &self,
        ride_id: Snowflake,
        passenger_id: Snowflake,
    ) -> ServiceResult<RideResponse> {
        let ride = self.require_ride(ride_id).await?;
        let passenger = self.require_user(passenger_id).await?;

        let notification = Notification::new(
            self.ctx.generate_id(),
            ride.driver_id,
            "Reservation cancelled",
            format!(
                "{} cancelled their reservation on your ride from {} to {}",
                passenger.first_name, ride.origin, ride.destination
            ),
            NotificationType::Warning,
        )
        .from_sender(passenger_id)
        .for_ride(ride_id);

        let ride = self
            .ctx
            .reservation_repo()
            .cancel_reservation(ride_id, passenger_id, &notification)
            .await?;

        info!(ride_id = %ride_id, passenger_id = %passenger_id, reserved = ride.reserved_seats, "Reservation cancelled");

        NotificationService::new(self.ctx).push(&notification, Companion::Cancellation);
        self.response(&ride).await
    }

    /// Edit a ride that nobody has booked yet
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        ride_id: Snowflake,
        user_id: Snowflake,
        request: RideDetailsRequest,
    ) -> ServiceResult<RideResponse> {
        self.require_driven_by(ride_id, user_id).await?;

        let update = RideUpdate {
            origin: request.origin.trim().to_string(),
            destination: request.destination.trim().to_string(),
            departure_time: request.departure_time,
            price: request.price,
            total_seats: request.total_seats,
        };
        let ride = self.ctx.ride_repo().update_details(ride_id, &update).await?;

        info!(ride_id = %ride_id, "Ride updated");
        self.response(&ride).await
    }

    /// Remove a ride for good, telling every passenger first
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        ride_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<DeleteRideResponse> {
        let ride = self.require_driven_by(ride_id, user_id).await?;
        let driver = self.require_user(user_id).await?;

        let message = format!(
            "{} removed the ride from {} to {}. Your reservation no longer exists.",
            driver.first_name, ride.origin, ride.destination
        );
        let notify = |passenger_id: Snowflake| {
            Notification::new(
                self.ctx.generate_id(),
                passenger_id,
                "Ride cancelled by driver",
                message.clone(),
                NotificationType::Error,
            )
            .from_sender(user_id)
        };

        let notifications = self
            .ctx
            .ride_repo()
            .delete_with_reservations(ride_id, &notify)
            .await?;

        info!(ride_id = %ride_id, notified = notifications.len(), "Ride deleted");

        NotificationService::new(self.ctx).push_all(&notifications, Companion::Cancellation);
        Ok(DeleteRideResponse {
            ride_id: ride_id.to_string(),
            notified_passengers: notifications.len(),
        })
    }

    /// Hide a ride from every listing; status is kept
    #[instrument(skip(self))]
    pub async fn archive(&self, ride_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        self.require_driven_by(ride_id, user_id).await?;
        self.ctx.ride_repo().archive(ride_id).await?;
        info!(ride_id = %ride_id, "Ride archived");
        Ok(())
    }

    /// Cancel a ride, penalizing late cancellations of booked rides
    #[instrument(skip(self, request))]
    pub async fn cancel(
        &self,
        ride_id: Snowflake,
        user_id: Snowflake,
        request: CancelRideRequest,
    ) -> ServiceResult<CancelRideResponse> {
        let ride = self.require_driven_by(ride_id, user_id).await?;
        let driver = self.require_user(user_id).await?;
        let reason = request.reason.trim().to_string();

        let message = format!(
            "{} cancelled the ride from {} to {}. Reason: {}",
            driver.first_name, ride.origin, ride.destination, reason
        );
        let notify = |passenger_id: Snowflake| {
            Notification::new(
                self.ctx.generate_id(),
                passenger_id,
                "Ride cancelled",
                message.clone(),
                NotificationType::Warning,
            )
            .from_sender(user_id)
            .for_ride(ride_id)
        };

        let outcome = self
            .ctx
            .ride_repo()
            .cancel(ride_id, &reason, Utc::now(), &notify)
            .await?;

        info!(
            ride_id = %ride_id,
            penalty = outcome.penalty,
            reputation = outcome.driver_reputation,
            notified = outcome.notifications.len(),
            "Ride cancelled"
        );

        NotificationService::new(self.ctx).push_all(&outcome.notifications, Companion::Cancellation);

        let mut driver = driver;
        driver.reputation = outcome.driver_reputation;
        let vehicles = self.vehicles(&[outcome.ride.vehicle_id]).await?;

        Ok(CancelRideResponse {
            ride: RideResponse::build(
                &outcome.ride,
                Some(&driver),
                vehicles.get(&outcome.ride.vehicle_id),
                Utc::now(),
            ),
            penalty: outcome.penalty,
            driver_reputation: outcome.driver_reputation,
            notified_passengers: outcome.notifications.len(),
        })
    }

    /// The driver's upcoming rides, or past and cancelled ones in history mode
    #[instrument(skip(self))]
    pub async fn driving(
        &self,
        driver_id: Snowflake,
        history: bool,
    ) -> ServiceResult<Vec<RideResponse>> {
        let rides = self
            .ctx
            .ride_repo()
            .find_for_driver(driver_id, history, Utc::now())
            .await?;
        self.responses(&rides).await
    }

    /// Rides the user has a seat on
    #[instrument(skip(self))]
    pub async fn passenger(&self, passenger_id: Snowflake) -> ServiceResult<Vec<RideResponse>> {
        let rides = self.ctx.ride_repo().find_for_passenger(passenger_id).await?;
        self.responses(&rides).await
    }

    // === Helpers ===

    async fn require_ride(&self, ride_id: Snowflake) -> ServiceResult<Ride> {
        Ok(self
            .ctx
            .ride_repo()
            .find_by_id(ride_id)
            .await?
            .ok_or(DomainError::RideNotFound(ride_id))?)
    }

    async fn require_driven_by(&self, ride_id: Snowflake, user_id: Snowflake) -> ServiceResult<Ride> {
        let ride = self.require_ride(ride_id).await?;
        if !ride.is_driver(user_id) {
            return Err(DomainError::NotRideDriver.into());
        }
        Ok(ride)
    }

    async fn require_user(&self, user_id: Snowflake) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?)
    }

    async fn vehicles(&self, ids: &[Snowflake]) -> ServiceResult<HashMap<Snowflake, Vehicle>> {
        Ok(self
            .ctx
            .vehicle_repo()
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect())
    }

    async fn response(&self, ride: &Ride) -> ServiceResult<RideResponse> {
        let mut responses = self.responses(std::slice::from_ref(ride)).await?;
        Ok(responses.remove(0))
    }

    /// Join drivers and vehicles onto a page of rides
    async fn responses(&self, rides: &[Ride]) -> ServiceResult<Vec<RideResponse>> {
        let mut driver_ids: Vec<Snowflake> = rides.iter().map(|r| r.driver_id).collect();
        driver_ids.sort_unstable();
        driver_ids.dedup();
        let mut vehicle_ids: Vec<Snowflake> = rides.iter().map(|r| r.vehicle_id).collect();
        vehicle_ids.sort_unstable();
        vehicle_ids.dedup();

        let drivers: HashMap<Snowflake, User> = self
            .ctx
            .user_repo()
            .find_by_ids(&driver_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let vehicles = self.vehicles(&vehicle_ids).await?;

        let now = Utc::now();
        Ok(rides
            .iter()
            .map(|ride| {
                RideResponse::build(
                    ride,
                    drivers.get(&ride.driver_id),
                    vehicles.get(&ride.vehicle_id),
                    now,
                )
            })
            .collect())
    }
}
