//! Connection management
//!
//! Live WebSocket sessions, the per-user registry used for pushes and
//! presence, and the sequence that orders presence writes.

mod connection;
mod presence;
mod registry;

pub use connection::{Connection, Outbound};
pub use presence::{PresenceSequence, PresenceTransition};
pub use registry::{ConnectionRegistry, SessionChange};
