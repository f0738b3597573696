//! Shared state behind the in-memory repositories

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use carpool_core::entities::{Message, Notification, Reservation, Review, Ride, User, Vehicle};
use carpool_core::error::DomainError;
use carpool_core::traits::RepoResult;
use carpool_core::value_objects::Snowflake;

/// A user row plus the columns the entity does not carry
#[derive(Debug, Clone)]
pub(super) struct StoredUser {
    pub user: User,
    pub password_hash: String,
    pub presence_seq: i64,
}

#[derive(Debug, Default)]
pub(super) struct Tables {
    pub users: HashMap<Snowflake, StoredUser>,
    pub vehicles: HashMap<Snowflake, Vehicle>,
    pub rides: HashMap<Snowflake, Ride>,
    pub reservations: Vec<Reservation>,
    pub notifications: HashMap<Snowflake, Notification>,
    pub messages: Vec<Message>,
    pub reviews: Vec<Review>,
}

impl Tables {
    pub fn require_user(&self, id: Snowflake) -> RepoResult<&StoredUser> {
        self.users.get(&id).ok_or(DomainError::UserNotFound(id))
    }

    pub fn require_ride(&self, id: Snowflake) -> RepoResult<&Ride> {
        self.rides.get(&id).ok_or(DomainError::RideNotFound(id))
    }

    /// Passenger ids holding a reservation on the ride, oldest booking first
    pub fn passenger_ids(&self, ride_id: Snowflake) -> Vec<Snowflake> {
        let mut held: Vec<&Reservation> = self
            .reservations
            .iter()
            .filter(|r| r.ride_id == ride_id)
            .collect();
        held.sort_by_key(|r| (r.reserved_at, r.id));
        held.into_iter().map(|r| r.passenger_id).collect()
    }

    /// Insert a notification, enforcing that the recipient exists
    pub fn insert_notification(&mut self, notification: &Notification) -> RepoResult<()> {
        self.require_user(notification.user_id)?;
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }
}

/// Handle to the shared tables; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock()
    }

    /// Number of stored reservations for a ride
    #[must_use]
    pub fn reservation_count(&self, ride_id: Snowflake) -> usize {
        self.lock()
            .reservations
            .iter()
            .filter(|r| r.ride_id == ride_id)
            .count()
    }

    /// Number of stored notifications for a user
    #[must_use]
    pub fn notification_count(&self, user_id: Snowflake) -> usize {
        self.lock()
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .count()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.lock();
        f.debug_struct("MemoryStore")
            .field("users", &tables.users.len())
            .field("rides", &tables.rides.len())
            .field("reservations", &tables.reservations.len())
            .finish_non_exhaustive()
    }
}
