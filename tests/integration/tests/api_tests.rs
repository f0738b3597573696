//! API Integration Tests
//!
//! Each test starts its own in-memory server on an ephemeral port.
//! Set INTEGRATION_BACKEND=postgres (plus DATABASE_URL and JWT_SECRET) to run
//! them against PostgreSQL instead.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get_root("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get_root("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_student() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::student("Ayse");

    let response = server.post("/auth/register", &request).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(auth.user.email, request.email);
    assert_eq!(auth.user.user_type, "student");
    assert_eq!(auth.token_type, "Bearer");
    assert!(auth.expires_in > 0);
    assert!((auth.user.reputation - 5.0).abs() < f64::EPSILON);
    assert!(!auth.access_token.is_empty());
    assert!(!auth.refresh_token.is_empty());
}

#[tokio::test]
async fn test_register_academician_requires_title() {
    let server = TestServer::start().await.unwrap();

    let ok = RegisterRequest::academician("Mehmet");
    let response = server.post("/auth/register", &ok).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(auth.user.user_type, "academician");

    let missing_title = RegisterRequest {
        title: None,
        ..RegisterRequest::academician("Mehmet")
    };
    let response = server.post("/auth/register", &missing_title).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::student("Ayse");

    let response = server.post("/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    // Same address in different case
    let again = RegisterRequest {
        email: request.email.to_uppercase(),
        ..request.clone()
    };
    let response = server.post("/auth/register", &again).await.unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "EMAIL_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_weak_password() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest {
        password: "onlyletters".to_string(),
        ..RegisterRequest::student("Ayse")
    };

    let response = server.post("/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_login() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::student("Ayse");
    let user = TestUser::register(&server, &request).await.unwrap();

    let response = server
        .post("/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(auth.user.id, user.id);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::student("Ayse");
    TestUser::register(&server, &request).await.unwrap();

    let wrong = LoginRequest {
        email: request.email.clone(),
        password: "wrongpass1".to_string(),
    };
    let response = server.post("/auth/login", &wrong).await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();

    // Unknown email looks exactly the same
    let unknown = LoginRequest {
        email: "nobody@ogr.bandirma.edu.tr".to_string(),
        password: TEST_PASSWORD.to_string(),
    };
    let response = server.post("/auth/login", &unknown).await.unwrap();
    let unknown_code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, unknown_code);
}

#[tokio::test]
async fn test_refresh_token() {
    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::student("Ayse");
    let response = server.post("/auth/register", &request).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post("/auth/refresh", &json!({ "refreshToken": auth.refresh_token }))
        .await
        .unwrap();
    let refreshed: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(refreshed.user.id, auth.user.id);

    // An access token is not a refresh token
    let response = server
        .post("/auth/refresh", &json!({ "refreshToken": auth.access_token }))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// User Tests
// ============================================================================

#[tokio::test]
async fn test_get_current_user() {
    let server = TestServer::start().await.unwrap();
    let user = TestUser::student(&server, "Ayse").await.unwrap();

    let response = server.get_auth("/users/@me", &user.token).await.unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.id, user.id);
    assert_eq!(me.email, user.email);
    assert_eq!(me.first_name, "Ayse");
}

#[tokio::test]
async fn test_get_current_user_unauthorized() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/users/@me").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");

    let response = server.get_auth("/users/@me", "not-a-jwt").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_public_profile_hides_contact_details() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let viewer = TestUser::student(&server, "Ayse").await.unwrap();

    let response = server
        .get_auth(&format!("/users/{}", driver.id), &viewer.token)
        .await
        .unwrap();
    let profile: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(profile["id"], driver.id.as_str());
    assert_eq!(profile["initials"], "AT");
    assert!(profile.get("email").is_none());
    assert!(profile.get("phoneNumber").is_none());
    assert_eq!(profile["vehicle"]["model"], "Fiat Egea");
    assert_eq!(profile["rating"]["count"], 0);
    assert_eq!(profile["isOnline"], false);
}

#[tokio::test]
async fn test_unknown_user_profile() {
    let server = TestServer::start().await.unwrap();
    let viewer = TestUser::student(&server, "Ayse").await.unwrap();

    let response = server.get_auth("/users/12345", &viewer.token).await.unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_USER");

    let response = server.get_auth("/users/abc", &viewer.token).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Ride Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_ride() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 3))
        .await
        .unwrap();
    assert_eq!(ride.total_seats, 3);
    assert_eq!(ride.available_seats, 3);
    assert_eq!(ride.status, "active");
    assert!(!ride.is_archived);

    let response = server.get(&format!("/rides/{}", ride.id)).await.unwrap();
    let fetched: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched["id"], ride.id.as_str());
    assert_eq!(fetched["driver"]["id"], driver.id.as_str());
    assert_eq!(fetched["vehicle"]["plateNumber"], "10 BNP 42");
}

#[tokio::test]
async fn test_create_ride_validation() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();

    let too_many_seats = RideRequest::departing_in(48, 9);
    let response = server
        .post_auth("/rides", &driver.token, &too_many_seats)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");

    let response = server
        .post("/rides", &RideRequest::departing_in(48, 2))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_search_rides() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let passenger = TestUser::student(&server, "Ayse").await.unwrap();

    let to_centre = driver
        .post_ride(&server, &RideRequest::departing_in(48, 3))
        .await
        .unwrap();
    driver
        .post_ride(
            &server,
            &RideRequest::departing_in(48, 3).route("Bandirma Campus", "Erdek"),
        )
        .await
        .unwrap();

    // Filters match case-insensitive substrings
    let response = server
        .get_auth("/rides?destination=centre", &passenger.token)
        .await
        .unwrap();
    let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].id, to_centre.id);

    // The driver does not see their own rides
    let response = server.get_auth("/rides", &driver.token).await.unwrap();
    let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(rides.is_empty());

    // Booked rides drop out of the passenger's search
    passenger.reserve(&server, &to_centre.id).await.unwrap();
    let response = server.get_auth("/rides", &passenger.token).await.unwrap();
    let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].destination, "Erdek");

    // Anonymous search sees everything open
    let response = server.get("/rides").await.unwrap();
    let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rides.len(), 2);
}

#[tokio::test]
async fn test_reserve_seat_notifies_driver() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let passenger = TestUser::student(&server, "Ayse").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 3))
        .await
        .unwrap();
    let booked = passenger.reserve(&server, &ride.id).await.unwrap();
    assert_eq!(booked.reserved_seats, 1);
    assert_eq!(booked.available_seats, 2);
    assert_eq!(booked.status, "has_passengers");

    let notifications = driver.notifications(&server).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "New reservation");
    assert_eq!(notifications[0].ride_id.as_deref(), Some(ride.id.as_str()));
    assert_eq!(notifications[0].sender_id.as_deref(), Some(passenger.id.as_str()));
    assert!(!notifications[0].is_read);

    let response = server.get_auth("/rides/passenger", &passenger.token).await.unwrap();
    let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rides.len(), 1);
}

#[tokio::test]
async fn test_reservation_rejections() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let first = TestUser::student(&server, "Ayse").await.unwrap();
    let second = TestUser::student(&server, "Can").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 1))
        .await
        .unwrap();
    let path = format!("/rides/{}/reservation", ride.id);

    let response = server.post_auth_empty(&path, &driver.token).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "CANNOT_RESERVE_OWN_RIDE");

    first.reserve(&server, &ride.id).await.unwrap();

    let response = server.post_auth_empty(&path, &first.token).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "ALREADY_RESERVED");

    let response = server.post_auth_empty(&path, &second.token).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "RIDE_FULL");

    let response = server
        .post_auth_empty("/rides/999999/reservation", &second.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_RIDE");
}

#[tokio::test]
async fn test_concurrent_reservations_never_overbook() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 2))
        .await
        .unwrap();

    let mut passengers = Vec::new();
    for i in 0..6 {
        passengers.push(TestUser::student(&server, &format!("P{i}")).await.unwrap());
    }

    let path = format!("/rides/{}/reservation", ride.id);
    let attempts = passengers
        .iter()
        .map(|p| server.post_auth_empty(&path, &p.token));
    let responses = futures_util::future::join_all(attempts).await;

    let mut ok = 0;
    let mut full = 0;
    for response in responses {
        let response = response.unwrap();
        match response.status() {
            StatusCode::OK => ok += 1,
            StatusCode::BAD_REQUEST => {
                let body: Value = response.json().await.unwrap();
                assert_eq!(body["error"]["code"], "RIDE_FULL");
                full += 1;
            }
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(ok, 2);
    assert_eq!(full, 4);

    let response = server.get(&format!("/rides/{}", ride.id)).await.unwrap();
    let ride: RideResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ride.reserved_seats, 2);
    assert_eq!(ride.available_seats, 0);
    assert_eq!(driver.unread_count(&server).await.unwrap(), 2);
}

#[tokio::test]
async fn test_cancel_reservation_frees_seat() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let passenger = TestUser::student(&server, "Ayse").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 2))
        .await
        .unwrap();
    passenger.reserve(&server, &ride.id).await.unwrap();

    let path = format!("/rides/{}/reservation", ride.id);
    let response = server.delete_auth(&path, &passenger.token).await.unwrap();
    let after: RideResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(after.reserved_seats, 0);
    assert_eq!(after.status, "active");

    // Nothing left to cancel
    let response = server.delete_auth(&path, &passenger.token).await.unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_RESERVATION");

    let titles: Vec<String> = driver
        .notifications(&server)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert!(titles.contains(&"Reservation cancelled".to_string()));
}

#[tokio::test]
async fn test_update_ride() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let other = TestUser::student(&server, "Ayse").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 2))
        .await
        .unwrap();
    let path = format!("/rides/{}", ride.id);

    let changed = RideRequest::departing_in(50, 4).route("Bandirma Campus", "Gonen");
    let response = server.put_auth(&path, &driver.token, &changed).await.unwrap();
    let updated: RideResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated.destination, "Gonen");
    assert_eq!(updated.total_seats, 4);

    let response = server.put_auth(&path, &other.token, &changed).await.unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "NOT_RIDE_DRIVER");

    // Booked rides are frozen
    other.reserve(&server, &ride.id).await.unwrap();
    let response = server.put_auth(&path, &driver.token, &changed).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "RIDE_HAS_PASSENGERS");
}

#[tokio::test]
async fn test_late_cancellation_penalizes_driver() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let passenger = TestUser::student(&server, "Ayse").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(1, 2))
        .await
        .unwrap();
    passenger.reserve(&server, &ride.id).await.unwrap();

    let path = format!("/rides/{}/cancel", ride.id);
    let response = server
        .post_auth(&path, &passenger.token, &json!({ "reason": "not mine" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_auth(&path, &driver.token, &json!({ "reason": "Car broke down" }))
        .await
        .unwrap();
    let outcome: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(outcome["penalty"], 20.0);
    // Reputation starts at 5 and never drops below zero
    assert_eq!(outcome["driverReputation"], 0.0);
    assert_eq!(outcome["notifiedPassengers"], 1);
    assert_eq!(outcome["ride"]["status"], "cancelled");
    assert_eq!(outcome["ride"]["cancelReason"], "Car broke down");

    let notifications = passenger.notifications(&server).await.unwrap();
    let cancelled = notifications
        .iter()
        .find(|n| n.title == "Ride cancelled")
        .expect("passenger was not notified");
    assert!(cancelled.message.contains("Car broke down"));
    assert_eq!(cancelled.kind, "warning");

    let response = server
        .post_auth(&path, &driver.token, &json!({ "reason": "again" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "RIDE_ALREADY_CANCELLED");

    let response = server.get_auth("/users/@me", &driver.token).await.unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(me.reputation.abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_early_cancellation_without_passengers_is_free() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(1, 2))
        .await
        .unwrap();
    let response = server
        .post_auth(
            &format!("/rides/{}/cancel", ride.id),
            &driver.token,
            &json!({ "reason": "Plans changed" }),
        )
        .await
        .unwrap();
    let outcome: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(outcome["penalty"], 0.0);
    assert_eq!(outcome["driverReputation"], 5.0);
    assert_eq!(outcome["notifiedPassengers"], 0);
}

#[tokio::test]
async fn test_delete_ride_notifies_passengers() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let passenger = TestUser::student(&server, "Ayse").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 2))
        .await
        .unwrap();
    passenger.reserve(&server, &ride.id).await.unwrap();

    let path = format!("/rides/{}", ride.id);
    let response = server.delete_auth(&path, &passenger.token).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.delete_auth(&path, &driver.token).await.unwrap();
    let deleted: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(deleted["rideId"], ride.id.as_str());
    assert_eq!(deleted["notifiedPassengers"], 1);

    let response = server.get(&path).await.unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_RIDE");

    // The notification outlives the ride it was about
    let notifications = passenger.notifications(&server).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Ride cancelled by driver");
    assert!(notifications[0].ride_id.is_none());

    let response = server.get_auth("/rides/passenger", &passenger.token).await.unwrap();
    let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(rides.is_empty());
}

#[tokio::test]
async fn test_archive_ride() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 2))
        .await
        .unwrap();
    let response = server
        .post_auth_empty(&format!("/rides/{}/archive", ride.id), &driver.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get(&format!("/rides/{}", ride.id)).await.unwrap();
    let archived: RideResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(archived.is_archived);

    // Archived rides are not offered anymore
    let response = server.get("/rides").await.unwrap();
    let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(rides.iter().all(|r| r.id != ride.id));

    // Nor listed to the driver, upcoming or past
    for path in ["/rides/driving", "/rides/driving?history=true"] {
        let response = server.get_auth(path, &driver.token).await.unwrap();
        let rides: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
        assert!(rides.is_empty());
    }
}

#[tokio::test]
async fn test_cancelled_ride_moves_to_history() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();

    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 2))
        .await
        .unwrap();
    let response = server
        .post_auth(
            &format!("/rides/{}/cancel", ride.id),
            &driver.token,
            &json!({ "reason": "Exam moved" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get_auth("/rides/driving", &driver.token).await.unwrap();
    let upcoming: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(upcoming.is_empty());

    let response = server
        .get_auth("/rides/driving?history=true", &driver.token)
        .await
        .unwrap();
    let history: Vec<RideResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].cancel_reason.as_deref(), Some("Exam moved"));
}

// ============================================================================
// Notification Tests
// ============================================================================

/// Driver with `count` notifications from distinct passengers
async fn driver_with_notifications(server: &TestServer, count: usize) -> TestUser {
    let driver = TestUser::driver(server, "Ali").await.unwrap();
    let ride = driver
        .post_ride(server, &RideRequest::departing_in(48, 8))
        .await
        .unwrap();
    for i in 0..count {
        let passenger = TestUser::student(server, &format!("P{i}")).await.unwrap();
        passenger.reserve(server, &ride.id).await.unwrap();
    }
    driver
}

#[tokio::test]
async fn test_mark_notifications_read() {
    let server = TestServer::start().await.unwrap();
    let driver = driver_with_notifications(&server, 3).await;
    assert_eq!(driver.unread_count(&server).await.unwrap(), 3);

    let notifications = driver.notifications(&server).await.unwrap();
    let response = server
        .post_auth_empty(
            &format!("/notifications/{}/read", notifications[0].id),
            &driver.token,
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    assert_eq!(driver.unread_count(&server).await.unwrap(), 2);

    let response = server
        .get_auth("/notifications?unread_only=true", &driver.token)
        .await
        .unwrap();
    let unread: Vec<NotificationResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.len(), 2);

    let response = server
        .post_auth_empty("/notifications/read-all", &driver.token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(driver.unread_count(&server).await.unwrap(), 0);
}

#[tokio::test]
async fn test_notifications_are_private() {
    let server = TestServer::start().await.unwrap();
    let driver = driver_with_notifications(&server, 1).await;
    let stranger = TestUser::student(&server, "Can").await.unwrap();

    let id = driver.notifications(&server).await.unwrap()[0].id.clone();

    let response = server
        .post_auth_empty(&format!("/notifications/{id}/read"), &stranger.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "NOT_NOTIFICATION_OWNER");

    let response = server
        .delete_auth(&format!("/notifications/{id}"), &stranger.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_auth("/notifications/bulk-delete", &stranger.token, &json!({ "ids": [id] }))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    assert_eq!(driver.notifications(&server).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_notifications() {
    let server = TestServer::start().await.unwrap();
    let driver = driver_with_notifications(&server, 4).await;
    let notifications = driver.notifications(&server).await.unwrap();

    let response = server
        .delete_auth(&format!("/notifications/{}", notifications[0].id), &driver.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let ids = vec![notifications[1].id.clone(), notifications[2].id.clone()];
    let response = server
        .post_auth("/notifications/bulk-delete", &driver.token, &json!({ "ids": ids }))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["count"], 2);

    let response = server
        .post_auth("/notifications/bulk-delete", &driver.token, &json!({ "ids": [] }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server.delete_auth("/notifications", &driver.token).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["count"], 1);
    assert!(driver.notifications(&server).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_notification_paging() {
    let server = TestServer::start().await.unwrap();
    let driver = driver_with_notifications(&server, 3).await;

    let response = server
        .get_auth("/notifications?limit=2&offset=0", &driver.token)
        .await
        .unwrap();
    let first: Vec<NotificationResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    let response = server
        .get_auth("/notifications?limit=2&offset=2", &driver.token)
        .await
        .unwrap();
    let second: Vec<NotificationResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);
    assert!(first.iter().all(|n| n.id != second[0].id));

    let response = server
        .get_auth("/notifications?limit=0", &driver.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Chat Tests
// ============================================================================

#[tokio::test]
async fn test_send_message_and_history() {
    let server = TestServer::start().await.unwrap();
    let alice = TestUser::student(&server, "Ayse").await.unwrap();
    let bob = TestUser::driver(&server, "Ali").await.unwrap();

    let response = server
        .post_auth(
            "/chat/messages",
            &alice.token,
            &json!({ "receiverId": bob.id, "content": "  Is there room for one more?  " }),
        )
        .await
        .unwrap();
    let sent: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(sent.content, "Is there room for one more?");
    assert_eq!(sent.sender_id, alice.id);
    assert_eq!(sent.receiver_id, bob.id);
    assert!(!sent.is_read);

    server
        .post_auth(
            "/chat/messages",
            &bob.token,
            &json!({ "receiverId": alice.id, "content": "Yes" }),
        )
        .await
        .unwrap();

    // Both sides see the same conversation, oldest first
    let response = server
        .get_auth(&format!("/chat/history/{}", alice.id), &bob.token)
        .await
        .unwrap();
    let history: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, sent.id);
    assert_eq!(history[1].content, "Yes");

    let response = server
        .post_auth_empty(&format!("/chat/history/{}/read", alice.id), &bob.token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["count"], 1);

    let response = server.get_auth("/chat/contacts", &alice.token).await.unwrap();
    let contacts: Vec<Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["id"], bob.id.as_str());

    let response = server
        .get_auth(&format!("/chat/contacts/{}", bob.id), &alice.token)
        .await
        .unwrap();
    let contact: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(contact["firstName"], "Ali");
}

#[tokio::test]
async fn test_send_message_rejections() {
    let server = TestServer::start().await.unwrap();
    let alice = TestUser::student(&server, "Ayse").await.unwrap();
    let bob = TestUser::student(&server, "Can").await.unwrap();

    let response = server
        .post_auth(
            "/chat/messages",
            &alice.token,
            &json!({ "receiverId": bob.id, "content": "   " }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "EMPTY_MESSAGE");

    let response = server
        .post_auth(
            "/chat/messages",
            &alice.token,
            &json!({ "receiverId": "999999", "content": "hello?" }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_USER");
}

// ============================================================================
// Review Tests
// ============================================================================

#[tokio::test]
async fn test_reviews_and_average() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 3))
        .await
        .unwrap();

    let average_path = format!("/reviews/users/{}/average", driver.id);

    // No reviews yet reads as a perfect score
    let response = server.get(&average_path).await.unwrap();
    let rating: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rating["average"], 5.0);
    assert_eq!(rating["count"], 0);

    for (name, score) in [("Ayse", 4), ("Can", 5), ("Deniz", 4)] {
        let rater = TestUser::student(&server, name).await.unwrap();
        let response = server
            .post_auth(
                "/reviews",
                &rater.token,
                &json!({
                    "rateeId": driver.id,
                    "rideId": ride.id,
                    "score": score,
                    "comment": "Smooth ride"
                }),
            )
            .await
            .unwrap();
        assert_status(response, StatusCode::CREATED).await.unwrap();
    }

    let response = server.get(&average_path).await.unwrap();
    let rating: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rating["average"], 4.3);
    assert_eq!(rating["count"], 3);

    let response = server
        .get(&format!("/reviews/users/{}", driver.id))
        .await
        .unwrap();
    let reviews: Vec<Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(reviews.len(), 3);
}

#[tokio::test]
async fn test_review_rejections() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let rater = TestUser::student(&server, "Ayse").await.unwrap();
    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 3))
        .await
        .unwrap();

    let response = server
        .post_auth(
            "/reviews",
            &driver.token,
            &json!({ "rateeId": driver.id, "rideId": ride.id, "score": 5 }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "CANNOT_REVIEW_SELF");

    let response = server
        .post_auth(
            "/reviews",
            &rater.token,
            &json!({ "rateeId": driver.id, "rideId": ride.id, "score": 6 }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_SCORE");
}
