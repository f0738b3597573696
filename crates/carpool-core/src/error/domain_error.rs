//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Ride not found: {0}")]
    RideNotFound(Snowflake),

    #[error("Reservation not found for ride {0}")]
    ReservationNotFound(Snowflake),

    #[error("Notification not found: {0}")]
    NotificationNotFound(Snowflake),

    #[error("Vehicle not found for user {0}")]
    VehicleNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Message content cannot be empty")]
    EmptyMessage,

    #[error("Score must be between 1 and 5")]
    InvalidScore,

    #[error("Users cannot review themselves")]
    CannotReviewSelf,

    #[error("Drivers cannot reserve a seat on their own ride")]
    CannotReserveOwnRide,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Only the driver can manage this ride")]
    NotRideDriver,

    #[error("Notification belongs to another user")]
    NotNotificationOwner,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    // =========================================================================
    // Business Rule Rejections
    // =========================================================================
    #[error("Ride is full")]
    RideFull,

    #[error("You already have a reservation on this ride")]
    AlreadyReserved,

    #[error("Ride has passengers and cannot be edited")]
    RideHasPassengers,

    #[error("Ride is no longer open for reservations")]
    RideUnavailable,

    #[error("Ride is already cancelled")]
    RideAlreadyCancelled,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::RideNotFound(_) => "UNKNOWN_RIDE",
            Self::ReservationNotFound(_) => "UNKNOWN_RESERVATION",
            Self::NotificationNotFound(_) => "UNKNOWN_NOTIFICATION",
            Self::VehicleNotFound(_) => "UNKNOWN_VEHICLE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::InvalidScore => "INVALID_SCORE",
            Self::CannotReviewSelf => "CANNOT_REVIEW_SELF",
            Self::CannotReserveOwnRide => "CANNOT_RESERVE_OWN_RIDE",

            // Authorization
            Self::NotRideDriver => "NOT_RIDE_DRIVER",
            Self::NotNotificationOwner => "NOT_NOTIFICATION_OWNER",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",

            // Business Rules
            Self::RideFull => "RIDE_FULL",
            Self::AlreadyReserved => "ALREADY_RESERVED",
            Self::RideHasPassengers => "RIDE_HAS_PASSENGERS",
            Self::RideUnavailable => "RIDE_UNAVAILABLE",
            Self::RideAlreadyCancelled => "RIDE_ALREADY_CANCELLED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::RideNotFound(_)
                | Self::ReservationNotFound(_)
                | Self::NotificationNotFound(_)
                | Self::VehicleNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::EmptyMessage
                | Self::InvalidScore
                | Self::CannotReviewSelf
                | Self::CannotReserveOwnRide
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotRideDriver | Self::NotNotificationOwner)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::EmailAlreadyExists)
    }

    /// Check if this is a ride/reservation business-rule rejection.
    /// Callers must change the request before retrying.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::RideFull
                | Self::AlreadyReserved
                | Self::RideHasPassengers
                | Self::RideUnavailable
                | Self::RideAlreadyCancelled
        )
    }
}
