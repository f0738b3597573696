//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` and render camelCase JSON.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Auth Responses
// ============================================================================

/// Authentication response with tokens
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: CurrentUserResponse,
}

impl AuthResponse {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        user: CurrentUserResponse,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

/// Fresh token pair without the user payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================================================
// User Responses
// ============================================================================

/// The authenticated user's own account, including contact details
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub user_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub reputation: f64,
    pub profile_photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What other users may see: no email, no phone number
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub initials: String,
    pub user_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub reputation: f64,
    pub profile_photo: Option<String>,
    pub is_online: bool,
    pub last_active_at: Option<DateTime<Utc>>,
}

/// Public profile page: user, vehicle and rating summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: PublicUserResponse,
    pub vehicle: Option<VehicleResponse>,
    pub rating: RatingResponse,
}

/// Vehicle details
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResponse {
    pub plate_number: String,
    pub model: String,
    pub color: String,
}

// ============================================================================
// Ride Responses
// ============================================================================

/// Driver as shown on a ride card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub reputation: f64,
}

/// A ride with its driver and vehicle projections
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideResponse {
    pub id: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub price: f64,
    pub total_seats: i32,
    pub reserved_seats: i32,
    pub available_seats: i32,
    /// Effective status; `completed` once the departure time has passed
    pub status: String,
    pub is_archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub driver: Option<DriverResponse>,
    pub vehicle: Option<VehicleResponse>,
}

/// Result of a driver cancelling a ride
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRideResponse {
    pub ride: RideResponse,
    pub penalty: f64,
    pub driver_reputation: f64,
    pub notified_passengers: usize,
}

/// Result of a driver deleting a ride
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRideResponse {
    pub ride_id: String,
    pub notified_passengers: usize,
}

// ============================================================================
// Notification Responses
// ============================================================================

/// Notification with the sender's display name resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_read: bool,
    pub ride_id: Option<String>,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub sender_initials: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

/// Number of rows touched by a bulk operation
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

// ============================================================================
// Chat Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

/// Someone in the user's chat list, with live presence
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_photo: Option<String>,
    pub is_online: bool,
    pub last_active_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Review Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub rater_id: String,
    pub rater_name: Option<String>,
    pub ratee_id: String,
    pub ride_id: String,
    pub score: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Average score, rounded to one decimal
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RatingResponse {
    pub average: f64,
    pub count: i64,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
