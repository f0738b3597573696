//! Route definitions
//!
//! REST routes are mounted under /api/v1; the gateway lives at /gateway.

use axum::{
    routing::{get, post},
    Router,
};
use carpool_gateway::gateway_routes;

use crate::handlers::{auth, chat, health, notifications, reviews, rides, users};
use crate::state::AppState;

/// REST API and gateway routes (health is exported separately to bypass rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(gateway_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(ride_routes())
        .merge(notification_routes())
        .merge(chat_routes())
        .merge(review_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/@me", get(users::get_current_user))
        .route("/users/:user_id", get(users::get_user))
}

fn ride_routes() -> Router<AppState> {
    Router::new()
        .route("/rides", post(rides::create_ride).get(rides::search_rides))
        .route("/rides/driving", get(rides::driving_rides))
        .route("/rides/passenger", get(rides::passenger_rides))
        .route(
            "/rides/:ride_id",
            get(rides::get_ride)
                .put(rides::update_ride)
                .delete(rides::delete_ride),
        )
        .route("/rides/:ride_id/archive", post(rides::archive_ride))
        .route("/rides/:ride_id/cancel", post(rides::cancel_ride))
        .route(
            "/rides/:ride_id/reservation",
            post(rides::reserve_seat).delete(rides::cancel_reservation),
        )
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(notifications::list_notifications).delete(notifications::delete_all),
        )
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/bulk-delete", post(notifications::bulk_delete))
        .route(
            "/notifications/:notification_id",
            axum::routing::delete(notifications::delete_notification),
        )
        .route("/notifications/:notification_id/read", post(notifications::mark_read))
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/messages", post(chat::send_message))
        .route("/chat/history/:user_id", get(chat::history))
        .route("/chat/history/:user_id/read", post(chat::mark_read))
        .route("/chat/contacts", get(chat::contacts))
        .route("/chat/contacts/:user_id", get(chat::contact))
}

fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/users/:user_id", get(reviews::list_reviews))
        .route("/reviews/users/:user_id/average", get(reviews::average_rating))
}
