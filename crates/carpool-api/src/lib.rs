//! # carpool-api
//!
//! HTTP API server built with Axum. Serves the REST routes under `/api/v1`,
//! health probes, and the WebSocket gateway at `/gateway`.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, serve};
pub use state::AppState;
