//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    BulkDeleteNotificationsRequest, CancelRideRequest, CreateReviewRequest, DriverRidesQuery,
    ListNotificationsQuery, LoginRequest, RefreshTokenRequest, RegisterRequest,
    RideDetailsRequest, SearchRidesQuery, SendMessageRequest, UserTypeRequest, VehicleRequest,
};

pub use responses::{
    AuthResponse, CancelRideResponse, ContactResponse, CountResponse, CurrentUserResponse,
    DeleteRideResponse, DriverResponse, HealthChecks, HealthResponse, MessageResponse,
    NotificationResponse, ProfileResponse, PublicUserResponse, RatingResponse, ReadinessResponse,
    ReviewResponse, RideResponse, TokenResponse, UnreadCountResponse, VehicleResponse,
};

pub use mappers::DEFAULT_AVERAGE;
