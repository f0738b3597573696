//! Repository traits (ports) - define the interface for data access
//!
//! Multi-row changes to a ride (reserving, cancelling, deleting) are single
//! repository calls so that implementations can run them as one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Message, Notification, Reservation, Review, Ride, User, Vehicle};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Builds the notification for one affected passenger inside a unit of work
pub type NotificationFactory<'a> = &'a (dyn Fn(Snowflake) -> Notification + Send + Sync);

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;

    /// Persist the online flag for a presence transition.
    ///
    /// `seq` orders transitions; the write is skipped (returns `false`) when a
    /// newer transition was already stored. Going offline stamps `last_active_at`.
    async fn set_presence(
        &self,
        id: Snowflake,
        is_online: bool,
        at: DateTime<Utc>,
        seq: i64,
    ) -> RepoResult<bool>;
}

// ============================================================================
// Vehicle Repository
// ============================================================================

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// The owner's single non-deleted vehicle
    async fn find_active_by_owner(&self, owner_id: Snowflake) -> RepoResult<Option<Vehicle>>;

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Vehicle>>;

    async fn create(&self, vehicle: &Vehicle) -> RepoResult<()>;

    /// Return the owner's active vehicle, inserting `fallback` if there is none
    async fn ensure_for_owner(&self, fallback: &Vehicle) -> RepoResult<Vehicle>;
}

// ============================================================================
// Ride Repository
// ============================================================================

/// Filters for the public ride search
#[derive(Debug, Clone)]
pub struct RideSearch {
    /// Case-insensitive substring of the origin
    pub origin: Option<String>,
    /// Case-insensitive substring of the destination
    pub destination: Option<String>,
    /// Rides this user drives or has reserved are left out
    pub viewer: Option<Snowflake>,
    pub now: DateTime<Utc>,
}

/// Editable ride details
#[derive(Debug, Clone)]
pub struct RideUpdate {
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub price: f64,
    pub total_seats: i32,
}

/// Outcome of a driver cancelling a ride
#[derive(Debug, Clone)]
pub struct RideCancellation {
    pub ride: Ride,
    /// Reputation deducted from the driver (0 when nobody had reserved)
    pub penalty: f64,
    /// Driver reputation after the penalty
    pub driver_reputation: f64,
    /// One per reservation holder, already persisted
    pub notifications: Vec<Notification>,
}

#[async_trait]
pub trait RideRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Ride>>;

    async fn create(&self, ride: &Ride) -> RepoResult<()>;

    /// Overwrite ride details, only while the ride has no passengers.
    ///
    /// Fails with `RideHasPassengers` if a seat is held at the moment of the write.
    async fn update_details(&self, id: Snowflake, update: &RideUpdate) -> RepoResult<Ride>;

    /// Set the archived flag; status is left untouched
    async fn archive(&self, id: Snowflake) -> RepoResult<()>;

    /// Open, future, non-archived rides matching the filters
    async fn search(&self, query: &RideSearch) -> RepoResult<Vec<Ride>>;

    /// Driver's rides. Active view ascending by departure, history view descending.
    async fn find_for_driver(
        &self,
        driver_id: Snowflake,
        history: bool,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Ride>>;

    /// Non-cancelled rides the passenger holds a confirmed reservation on
    async fn find_for_passenger(&self, passenger_id: Snowflake) -> RepoResult<Vec<Ride>>;

    /// Notify every reservation holder, remove the reservations, then the ride.
    /// Returns the persisted notifications.
    async fn delete_with_reservations(
        &self,
        id: Snowflake,
        notify: NotificationFactory<'_>,
    ) -> RepoResult<Vec<Notification>>;

    /// Penalize the driver if anyone reserved, notify every holder, and mark
    /// the ride cancelled. Reservations are kept.
    async fn cancel(
        &self,
        id: Snowflake,
        reason: &str,
        now: DateTime<Utc>,
        notify: NotificationFactory<'_>,
    ) -> RepoResult<RideCancellation>;
}

// ============================================================================
// Reservation Repository
// ============================================================================

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn find(
        &self,
        ride_id: Snowflake,
        passenger_id: Snowflake,
    ) -> RepoResult<Option<Reservation>>;

    async fn find_by_ride(&self, ride_id: Snowflake) -> RepoResult<Vec<Reservation>>;

    /// Seat-reservation protocol as one atomic unit:
    /// reject duplicates, take a seat only while `reserved_seats < total_seats`,
    /// insert the reservation and the driver notification. Nothing is written
    /// on failure. Returns the ride with its updated counters.
    async fn reserve_seat(
        &self,
        reservation: &Reservation,
        driver_notification: &Notification,
        now: DateTime<Utc>,
    ) -> RepoResult<Ride>;

    /// Remove the passenger's reservation, give the seat back, and store the
    /// driver notification, atomically. `ReservationNotFound` if none exists.
    async fn cancel_reservation(
        &self,
        ride_id: Snowflake,
        passenger_id: Snowflake,
        driver_notification: &Notification,
    ) -> RepoResult<Ride>;
}

// ============================================================================
// Notification Repository
// ============================================================================

/// Listing options for a recipient's notifications
#[derive(Debug, Clone, Default)]
pub struct NotificationQuery {
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: i64,
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> RepoResult<()>;

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>>;

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Notification>>;

    /// Newest first
    async fn list(
        &self,
        user_id: Snowflake,
        query: &NotificationQuery,
    ) -> RepoResult<Vec<Notification>>;

    async fn unread_count(&self, user_id: Snowflake) -> RepoResult<i64>;

    async fn mark_read(&self, id: Snowflake) -> RepoResult<()>;

    async fn mark_all_read(&self, user_id: Snowflake) -> RepoResult<u64>;

    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Delete the listed notifications that belong to `user_id`
    async fn delete_many(&self, user_id: Snowflake, ids: &[Snowflake]) -> RepoResult<u64>;

    async fn delete_all(&self, user_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Both directions between two users, oldest first
    async fn conversation(&self, a: Snowflake, b: Snowflake) -> RepoResult<Vec<Message>>;

    /// Mark every unread message from `other_id` to `reader_id` as read
    async fn mark_conversation_read(
        &self,
        reader_id: Snowflake,
        other_id: Snowflake,
    ) -> RepoResult<u64>;

    /// Everyone the user has exchanged at least one message with
    async fn contact_ids(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Review Repository
// ============================================================================

/// Arithmetic mean of a user's scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: i64,
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Store the review and the ratee's notification together
    async fn create(&self, review: &Review, ratee_notification: &Notification) -> RepoResult<()>;

    /// Newest first
    async fn find_by_ratee(&self, ratee_id: Snowflake) -> RepoResult<Vec<Review>>;

    async fn summary(&self, ratee_id: Snowflake) -> RepoResult<RatingSummary>;
}
