//! # carpool-gateway
//!
//! WebSocket push channel: live sessions per user, presence tracking, and
//! chat over the socket.

pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use connection::{ConnectionRegistry, PresenceSequence, PresenceTransition};
pub use server::{gateway_routes, GatewayState};
