//! Live delivery port - pushes events to currently connected sessions

use crate::events::DomainEvent;
use crate::value_objects::Snowflake;

/// Registry of live push-channel sessions, keyed by user.
///
/// Delivery is best-effort: sends to a closed session are dropped and
/// nothing is queued for users without a session.
pub trait LiveDelivery: Send + Sync {
    /// Whether the user has at least one live session
    fn is_online(&self, user_id: Snowflake) -> bool;

    /// Number of live sessions for the user
    fn session_count(&self, user_id: Snowflake) -> usize;

    /// Push to every session of one user; returns how many sessions accepted it
    fn send_to_user(&self, user_id: Snowflake, event: &DomainEvent) -> usize;

    /// Push to every live session
    fn broadcast(&self, event: &DomainEvent) -> usize;
}
