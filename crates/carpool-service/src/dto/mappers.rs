//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs, plus
//! constructors for responses that join several entities.

use carpool_common::TokenPair;
use carpool_core::{Message, Notification, RatingSummary, Review, Ride, User, UserKind, Vehicle};
use chrono::{DateTime, Utc};

use super::responses::{
    ContactResponse, CurrentUserResponse, DriverResponse, MessageResponse, NotificationResponse,
    PublicUserResponse, RatingResponse, ReviewResponse, RideResponse, TokenResponse,
    VehicleResponse,
};

/// Average reported when a user has not been reviewed yet
pub const DEFAULT_AVERAGE: f64 = 5.0;

// ============================================================================
// User Mappers
// ============================================================================

fn kind_fields(kind: &UserKind) -> (Option<String>, Option<String>, Option<String>) {
    match kind {
        UserKind::Student { student_number } => (Some(student_number.clone()), None, None),
        UserKind::Academician { title, department } => {
            (None, Some(title.clone()), Some(department.clone()))
        }
    }
}

impl From<&User> for CurrentUserResponse {
    fn from(user: &User) -> Self {
        let (student_number, title, department) = kind_fields(&user.kind);
        Self {
            id: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            user_type: user.kind.as_str().to_string(),
            student_number,
            title,
            department,
            reputation: user.reputation,
            profile_photo: user.profile_photo.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<&User> for PublicUserResponse {
    fn from(user: &User) -> Self {
        let (_, title, department) = kind_fields(&user.kind);
        Self {
            id: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            initials: user.initials(),
            user_type: user.kind.as_str().to_string(),
            title,
            department,
            reputation: user.reputation,
            profile_photo: user.profile_photo.clone(),
            is_online: user.is_online,
            last_active_at: user.last_active_at,
        }
    }
}

impl From<&User> for DriverResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            reputation: user.reputation,
        }
    }
}

impl ContactResponse {
    pub fn from_user(user: &User, is_online: bool) -> Self {
        Self {
            id: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            profile_photo: user.profile_photo.clone(),
            is_online,
            last_active_at: user.last_active_at,
        }
    }
}

impl From<&Vehicle> for VehicleResponse {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            plate_number: vehicle.plate_number.clone(),
            model: vehicle.model.clone(),
            color: vehicle.color.clone(),
        }
    }
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
        }
    }
}

// ============================================================================
// Ride Mappers
// ============================================================================

impl RideResponse {
    /// Project a ride as seen at `now`, with its driver and vehicle if known
    pub fn build(
        ride: &Ride,
        driver: Option<&User>,
        vehicle: Option<&Vehicle>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ride.id.to_string(),
            origin: ride.origin.clone(),
            destination: ride.destination.clone(),
            departure_time: ride.departure_time,
            price: ride.price,
            total_seats: ride.total_seats,
            reserved_seats: ride.reserved_seats,
            available_seats: ride.available_seats(),
            status: ride.effective_status(now).as_str().to_string(),
            is_archived: ride.is_archived,
            cancel_reason: ride.cancel_reason.clone(),
            cancelled_at: ride.cancelled_at,
            created_at: ride.created_at,
            driver: driver.map(DriverResponse::from),
            vehicle: vehicle.map(VehicleResponse::from),
        }
    }
}

// ============================================================================
// Notification Mappers
// ============================================================================

impl NotificationResponse {
    pub fn build(notification: &Notification, sender: Option<&User>) -> Self {
        Self {
            id: notification.id.to_string(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            kind: notification.kind.as_str().to_string(),
            is_read: notification.is_read,
            ride_id: notification.related_ride_id.map(|id| id.to_string()),
            sender_id: notification.sender_id.map(|id| id.to_string()),
            sender_name: sender.map(User::full_name),
            sender_initials: sender.map(User::initials),
            created_at: notification.created_at,
        }
    }
}

// ============================================================================
// Chat Mappers
// ============================================================================

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender_id.to_string(),
            receiver_id: message.receiver_id.to_string(),
            content: message.content.clone(),
            timestamp: message.timestamp,
            is_read: message.is_read,
        }
    }
}

// ============================================================================
// Review Mappers
// ============================================================================

impl ReviewResponse {
    pub fn build(review: &Review, rater: Option<&User>) -> Self {
        Self {
            id: review.id.to_string(),
            rater_id: review.rater_id.to_string(),
            rater_name: rater.map(User::full_name),
            ratee_id: review.ratee_id.to_string(),
            ride_id: review.ride_id.to_string(),
            score: review.score,
            comment: review.comment.clone(),
            created_at: review.created_at,
        }
    }
}

impl From<RatingSummary> for RatingResponse {
    fn from(summary: RatingSummary) -> Self {
        match summary.average {
            Some(avg) if summary.count > 0 => Self {
                average: (avg * 10.0).round() / 10.0,
                count: summary.count,
            },
            _ => Self {
                average: DEFAULT_AVERAGE,
                count: 0,
            },
        }
    }
}
