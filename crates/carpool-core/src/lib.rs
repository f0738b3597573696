//! # carpool-core
//!
//! Domain layer containing entities, the ride lifecycle rules, repository traits,
//! and the events pushed to live connections.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    cancellation_penalty, Message, Notification, NotificationType, Reservation, Review, Ride,
    RideStatus, User, UserKind, Vehicle, DEFAULT_REPUTATION,
};
pub use error::DomainError;
pub use events::{DomainEvent, MessageEvent, NotificationEvent, UserStatusChangedEvent};
pub use traits::{
    LiveDelivery, MessageRepository, NotificationFactory, NotificationQuery,
    NotificationRepository, RatingSummary, RepoResult, ReservationRepository, ReviewRepository,
    RideCancellation, RideRepository, RideSearch, RideUpdate, UserRepository, VehicleRepository,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
