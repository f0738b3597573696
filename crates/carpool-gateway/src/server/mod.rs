//! Gateway server setup
//!
//! Routes for the WebSocket endpoint. The API binary merges these into its
//! router; any state that can produce a [`GatewayState`] works.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;

/// Router with the `/gateway` upgrade endpoint
pub fn gateway_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    GatewayState: FromRef<S>,
{
    Router::new().route("/gateway", get(gateway_handler))
}
