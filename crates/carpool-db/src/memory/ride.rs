//! In-memory RideRepository and ReservationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use carpool_core::entities::{cancellation_penalty, Notification, Reservation, Ride, RideStatus};
use carpool_core::error::DomainError;
use carpool_core::traits::{
    NotificationFactory, RepoResult, ReservationRepository, RideCancellation, RideRepository,
    RideSearch, RideUpdate,
};
use carpool_core::value_objects::Snowflake;

use super::store::MemoryStore;

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Clone, Debug)]
pub struct MemoryRideRepository {
    store: MemoryStore,
}

impl MemoryRideRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RideRepository for MemoryRideRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Ride>> {
        Ok(self.store.lock().rides.get(&id).cloned())
    }

    async fn create(&self, ride: &Ride) -> RepoResult<()> {
        let mut tables = self.store.lock();
        tables.require_user(ride.driver_id)?;
        tables.rides.insert(ride.id, ride.clone());
        Ok(())
    }

    async fn update_details(&self, id: Snowflake, update: &RideUpdate) -> RepoResult<Ride> {
        let mut tables = self.store.lock();
        let ride = tables
            .rides
            .get_mut(&id)
            .ok_or(DomainError::RideNotFound(id))?;

        if !ride.is_editable() {
            return Err(if ride.status == RideStatus::Cancelled {
                DomainError::RideUnavailable
            } else {
                DomainError::RideHasPassengers
            });
        }

        ride.origin.clone_from(&update.origin);
        ride.destination.clone_from(&update.destination);
        ride.departure_time = update.departure_time;
        ride.price = update.price;
        ride.total_seats = update.total_seats;
        ride.updated_at = Utc::now();
        Ok(ride.clone())
    }

    async fn archive(&self, id: Snowflake) -> RepoResult<()> {
        let mut tables = self.store.lock();
        let ride = tables
            .rides
            .get_mut(&id)
            .ok_or(DomainError::RideNotFound(id))?;
        ride.archive();
        Ok(())
    }

    async fn search(&self, query: &RideSearch) -> RepoResult<Vec<Ride>> {
        let tables = self.store.lock();
        let mut rides: Vec<Ride> = tables
            .rides
            .values()
            .filter(|r| !r.is_archived && r.status != RideStatus::Cancelled)
            .filter(|r| r.departure_time > query.now)
            .filter(|r| {
                query
                    .origin
                    .as_deref()
                    .map_or(true, |o| contains_ignore_case(&r.origin, o))
            })
            .filter(|r| {
                query
                    .destination
                    .as_deref()
                    .map_or(true, |d| contains_ignore_case(&r.destination, d))
            })
            .filter(|r| match query.viewer {
                Some(viewer) => {
                    r.driver_id != viewer
                        && !tables
                            .reservations
                            .iter()
                            .any(|res| res.ride_id == r.id && res.passenger_id == viewer)
                }
                None => true,
            })
            .cloned()
            .collect();

        rides.sort_by_key(|r| (r.departure_time, r.id));
        Ok(rides)
    }

    async fn find_for_driver(
        &self,
        driver_id: Snowflake,
        history: bool,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Ride>> {
        let tables = self.store.lock();
        let mut rides: Vec<Ride> = tables
            .rides
            .values()
            .filter(|r| r.driver_id == driver_id && !r.is_archived)
            .filter(|r| {
                let closed = r.status == RideStatus::Cancelled || r.has_departed(now);
                closed == history
            })
            .cloned()
            .collect();

        if history {
            rides.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));
        } else {
            rides.sort_by_key(|r| r.departure_time);
        }
        Ok(rides)
    }

    async fn find_for_passenger(&self, passenger_id: Snowflake) -> RepoResult<Vec<Ride>> {
        let tables = self.store.lock();
        let mut rides: Vec<Ride> = tables
            .reservations
            .iter()
            .filter(|res| res.passenger_id == passenger_id && res.is_confirmed)
            .filter_map(|res| tables.rides.get(&res.ride_id))
            .filter(|r| r.status != RideStatus::Cancelled && !r.is_archived)
            .cloned()
            .collect();

        rides.sort_by_key(|r| r.departure_time);
        Ok(rides)
    }

    async fn delete_with_reservations(
        &self,
        id: Snowflake,
        notify: NotificationFactory<'_>,
    ) -> RepoResult<Vec<Notification>> {
        let mut tables = self.store.lock();
        tables.require_ride(id)?;

        let notifications: Vec<Notification> = tables
            .passenger_ids(id)
            .into_iter()
            .map(notify)
            .collect();
        for notification in &notifications {
            tables.require_user(notification.user_id)?;
        }
        for notification in &notifications {
            tables
                .notifications
                .insert(notification.id, notification.clone());
        }

        tables.reservations.retain(|r| r.ride_id != id);
        tables.reviews.retain(|r| r.ride_id != id);
        tables.rides.remove(&id);
        Ok(notifications)
    }

    async fn cancel(
        &self,
        id: Snowflake,
        reason: &str,
        now: DateTime<Utc>,
        notify: NotificationFactory<'_>,
    ) -> RepoResult<RideCancellation> {
        let mut tables = self.store.lock();
        let ride = tables.require_ride(id)?.clone();
        if ride.status == RideStatus::Cancelled {
            return Err(DomainError::RideAlreadyCancelled);
        }

        let passengers = tables.passenger_ids(id);
        let penalty = if passengers.is_empty() {
            0.0
        } else {
            cancellation_penalty(ride.departure_time, now)
        };

        let notifications: Vec<Notification> = passengers.into_iter().map(notify).collect();
        for notification in &notifications {
            tables.require_user(notification.user_id)?;
        }

        let driver = tables
            .users
            .get_mut(&ride.driver_id)
            .ok_or(DomainError::UserNotFound(ride.driver_id))?;
        let driver_reputation = driver.user.apply_penalty(penalty);

        for notification in &notifications {
            tables
                .notifications
                .insert(notification.id, notification.clone());
        }

        let stored = tables
            .rides
            .get_mut(&id)
            .ok_or(DomainError::RideNotFound(id))?;
        stored.cancel(reason.to_string(), now);

        Ok(RideCancellation {
            ride: stored.clone(),
            penalty,
            driver_reputation,
            notifications,
        })
    }
}

#[derive(Clone, Debug)]
pub struct MemoryReservationRepository {
    store: MemoryStore,
}

impl MemoryReservationRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservationRepository {
    async fn find(
        &self,
        ride_id: Snowflake,
        passenger_id: Snowflake,
    ) -> RepoResult<Option<Reservation>> {
        Ok(self
            .store
            .lock()
            .reservations
            .iter()
            .find(|r| r.ride_id == ride_id && r.passenger_id == passenger_id)
            .cloned())
    }

    async fn find_by_ride(&self, ride_id: Snowflake) -> RepoResult<Vec<Reservation>> {
        let mut held: Vec<Reservation> = self
            .store
            .lock()
            .reservations
            .iter()
            .filter(|r| r.ride_id == ride_id)
            .cloned()
            .collect();
        held.sort_by_key(|r| (r.reserved_at, r.id));
        Ok(held)
    }

    async fn reserve_seat(
        &self,
        reservation: &Reservation,
        driver_notification: &Notification,
        now: DateTime<Utc>,
    ) -> RepoResult<Ride> {
        let mut tables = self.store.lock();
        let ride_id = reservation.ride_id;

        if tables
            .reservations
            .iter()
            .any(|r| r.ride_id == ride_id && r.passenger_id == reservation.passenger_id)
        {
            return Err(DomainError::AlreadyReserved);
        }

        let current = tables.require_ride(ride_id)?;
        if !current.is_bookable(now) {
            return Err(DomainError::RideUnavailable);
        }
        if current.is_full() {
            return Err(DomainError::RideFull);
        }
        tables.require_user(reservation.passenger_id)?;
        tables.require_user(driver_notification.user_id)?;

        let ride = tables
            .rides
            .get_mut(&ride_id)
            .ok_or(DomainError::RideNotFound(ride_id))?;
        if !ride.try_reserve_seat() {
            return Err(DomainError::RideFull);
        }
        let ride = ride.clone();

        tables.reservations.push(reservation.clone());
        tables.insert_notification(driver_notification)?;
        Ok(ride)
    }

    async fn cancel_reservation(
        &self,
        ride_id: Snowflake,
        passenger_id: Snowflake,
        driver_notification: &Notification,
    ) -> RepoResult<Ride> {
        let mut tables = self.store.lock();
        let index = tables
            .reservations
            .iter()
            .position(|r| r.ride_id == ride_id && r.passenger_id == passenger_id)
            .ok_or(DomainError::ReservationNotFound(ride_id))?;
        tables.require_user(driver_notification.user_id)?;

        let ride = tables
            .rides
            .get_mut(&ride_id)
            .ok_or(DomainError::RideNotFound(ride_id))?;
        ride.release_seat();
        let ride = ride.clone();

        tables.reservations.swap_remove(index);
        tables.insert_notification(driver_notification)?;
        Ok(ride)
    }
}
