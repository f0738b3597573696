//! Request DTOs for API endpoints
//!
//! Bodies are camelCase JSON and implement `Deserialize` and `Validate`.
//! Query strings keep their snake_case parameter names.

use carpool_core::Snowflake;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth Requests
// ============================================================================

/// Which kind of university member is registering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTypeRequest {
    #[serde(alias = "Student")]
    Student,
    #[serde(alias = "Academician")]
    Academician,
}

/// Vehicle details supplied by a driver at registration
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequest {
    #[validate(length(min = 2, max = 16, message = "Plate number must be 2-16 characters"))]
    pub plate_number: String,

    #[validate(length(min = 1, max = 64, message = "Model must be 1-64 characters"))]
    pub model: String,

    #[validate(length(min = 1, max = 32, message = "Color must be 1-32 characters"))]
    pub color: String,
}

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,

    #[validate(length(min = 7, max = 20, message = "Phone number must be 7-20 characters"))]
    pub phone_number: String,

    pub user_type: UserTypeRequest,

    /// Required for students
    #[serde(default)]
    pub student_number: Option<String>,

    /// Required for academicians
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub department: Option<String>,

    #[serde(default)]
    pub is_driver: bool,

    #[serde(default)]
    #[validate(nested)]
    pub vehicle: Option<VehicleRequest>,
}

/// User login request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

// ============================================================================
// Ride Requests
// ============================================================================

/// Ride details, used both to post a ride and to edit one
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RideDetailsRequest {
    #[validate(length(min = 1, max = 100, message = "Origin must be 1-100 characters"))]
    pub origin: String,

    #[validate(length(min = 1, max = 100, message = "Destination must be 1-100 characters"))]
    pub destination: String,

    pub departure_time: DateTime<Utc>,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,

    #[validate(range(min = 1, max = 8, message = "A ride offers 1-8 seats"))]
    pub total_seats: i32,
}

/// Driver cancellation of a ride
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelRideRequest {
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

/// Query parameters for ride search
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SearchRidesQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
}

/// Query parameters for the driver's own rides
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DriverRidesQuery {
    #[serde(default)]
    pub history: bool,
}

// ============================================================================
// Notification Requests
// ============================================================================

/// Query parameters for listing notifications
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,

    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<i64>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Offset cannot be negative"))]
    pub offset: i64,
}

/// Delete several notifications at once
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteNotificationsRequest {
    #[validate(length(min = 1, max = 100, message = "Provide 1-100 notification ids"))]
    pub ids: Vec<Snowflake>,
}

// ============================================================================
// Chat Requests
// ============================================================================

/// Send a direct message
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Snowflake,

    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub content: String,
}

// ============================================================================
// Review Requests
// ============================================================================

/// Rate another user after a shared ride
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub ratee_id: Snowflake,

    pub ride_id: Snowflake,

    pub score: i16,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: String,
}
