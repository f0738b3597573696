//! Test fixtures and data generators
//!
//! Request bodies for registering users and posting rides, plus typed views
//! of the responses the tests inspect.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::helpers::{assert_json, TestServer};

/// Password that satisfies the strength rules
pub const TEST_PASSWORD: &str = "banupool1";

/// Vehicle details sent with a driver registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequest {
    pub plate_number: String,
    pub model: String,
    pub color: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub user_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub is_driver: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleRequest>,
}

impl RegisterRequest {
    /// A student with a fresh university email
    pub fn student(first_name: &str) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            first_name: first_name.to_string(),
            last_name: "Test".to_string(),
            email: format!("{}.{}@ogr.bandirma.edu.tr", first_name.to_lowercase(), &suffix[..12]),
            password: TEST_PASSWORD.to_string(),
            phone_number: "05551234567".to_string(),
            user_type: "student".to_string(),
            student_number: Some(format!("2021{}", &suffix[..6])),
            title: None,
            department: None,
            is_driver: false,
            vehicle: None,
        }
    }

    /// A student who registers a car
    pub fn driver(first_name: &str) -> Self {
        Self {
            is_driver: true,
            vehicle: Some(VehicleRequest {
                plate_number: "10 BNP 42".to_string(),
                model: "Fiat Egea".to_string(),
                color: "White".to_string(),
            }),
            ..Self::student(first_name)
        }
    }

    /// An academician, who has a title instead of a student number
    pub fn academician(first_name: &str) -> Self {
        Self {
            user_type: "academician".to_string(),
            student_number: None,
            title: Some("Dr.".to_string()),
            department: Some("Computer Engineering".to_string()),
            ..Self::student(first_name)
        }
    }
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            email: reg.email.clone(),
            password: reg.password.clone(),
        }
    }
}

/// Auth response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Current user as returned by auth and /users/@me
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub email: String,
    pub user_type: String,
    pub reputation: f64,
}

/// Ride details for create and update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequest {
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub price: f64,
    pub total_seats: i32,
}

impl RideRequest {
    /// Campus to city centre, departing `hours` from now
    pub fn departing_in(hours: i64, seats: i32) -> Self {
        Self {
            origin: "Bandirma Campus".to_string(),
            destination: "City Centre".to_string(),
            departure_time: Utc::now() + Duration::hours(hours),
            price: 25.0,
            total_seats: seats,
        }
    }

    pub fn route(mut self, origin: &str, destination: &str) -> Self {
        self.origin = origin.to_string();
        self.destination = destination.to_string();
        self
    }
}

/// Ride response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideResponse {
    pub id: String,
    pub origin: String,
    pub destination: String,
    pub total_seats: i32,
    pub reserved_seats: i32,
    pub available_seats: i32,
    pub status: String,
    pub is_archived: bool,
    pub cancel_reason: Option<String>,
}

/// Notification response
#[derive(Debug, Deserialize)]
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
}

/// Chat message response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub is_read: bool,
}

/// A registered user with a live token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub token: String,
    pub email: String,
}

impl TestUser {
    /// Register `request` and keep the resulting identity
    pub async fn register(server: &TestServer, request: &RegisterRequest) -> Result<Self> {
        let response = server.post("/auth/register", request).await?;
        let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await?;
        Ok(Self {
            id: auth.user.id,
            token: auth.access_token,
            email: request.email.clone(),
        })
    }

    pub async fn student(server: &TestServer, first_name: &str) -> Result<Self> {
        Self::register(server, &RegisterRequest::student(first_name)).await
    }

    pub async fn driver(server: &TestServer, first_name: &str) -> Result<Self> {
        Self::register(server, &RegisterRequest::driver(first_name)).await
    }

    /// Post a ride as this user
    pub async fn post_ride(&self, server: &TestServer, ride: &RideRequest) -> Result<RideResponse> {
        let response = server.post_auth("/rides", &self.token, ride).await?;
        assert_json(response, StatusCode::CREATED).await
    }

    /// Reserve a seat on `ride_id` as this user
    pub async fn reserve(&self, server: &TestServer, ride_id: &str) -> Result<RideResponse> {
        let response = server
            .post_auth_empty(&format!("/rides/{ride_id}/reservation"), &self.token)
            .await?;
        assert_json(response, StatusCode::OK).await
    }

    pub async fn notifications(&self, server: &TestServer) -> Result<Vec<NotificationResponse>> {
        let response = server.get_auth("/notifications", &self.token).await?;
        assert_json(response, StatusCode::OK).await
    }

    pub async fn unread_count(&self, server: &TestServer) -> Result<i64> {
        let response = server
            .get_auth("/notifications/unread-count", &self.token)
            .await?;
        let body: serde_json::Value = assert_json(response, StatusCode::OK).await?;
        Ok(body["unreadCount"].as_i64().unwrap_or_default())
    }
}
