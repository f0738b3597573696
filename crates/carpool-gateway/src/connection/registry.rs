//! Connection registry
//!
//! Every live session, grouped by user. This is the process-wide registry the
//! services push through; it is created at server start and injected as the
//! `LiveDelivery` implementation. The per-user session set is also the only
//! session count presence is derived from.

use std::collections::HashSet;
use std::sync::Arc;

use carpool_core::{DomainEvent, LiveDelivery, Snowflake};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;

use super::{Connection, Outbound, PresenceSequence, PresenceTransition};
use crate::protocol::GatewayMessage;

/// Outcome of adding or removing a session
#[derive(Debug)]
pub struct SessionChange {
    pub connection: Arc<Connection>,
    /// Set when the change took the user's session count across zero
    pub presence: Option<PresenceTransition>,
}

pub struct ConnectionRegistry {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// User ID to session IDs
    user_connections: DashMap<Snowflake, HashSet<String>>,

    presence: PresenceSequence,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_sequence(PresenceSequence::new())
    }

    #[must_use]
    pub fn with_sequence(presence: PresenceSequence) -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            presence,
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register an authenticated session
    pub fn add_connection(
        &self,
        session_id: String,
        user_id: Snowflake,
        sender: mpsc::Sender<Outbound>,
    ) -> SessionChange {
        let connection = Connection::new(session_id.clone(), user_id, sender);
        self.connections.insert(session_id.clone(), connection.clone());

        let presence = {
            let mut sessions = self.user_connections.entry(user_id).or_default();
            sessions.insert(session_id.clone());
            (sessions.len() == 1).then(|| self.presence.stamp(user_id, true))
        };

        tracing::debug!(session_id = %session_id, user_id = %user_id, "Connection added");
        SessionChange {
            connection,
            presence,
        }
    }

    /// Remove a session; the user's entry goes away with their last session
    pub fn remove_connection(&self, session_id: &str) -> Option<SessionChange> {
        let (_, connection) = self.connections.remove(session_id)?;
        let user_id = connection.user_id();

        let presence = match self.user_connections.entry(user_id) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().remove(session_id);
                if entry.get().is_empty() {
                    let transition = self.presence.stamp(user_id, false);
                    entry.remove();
                    Some(transition)
                } else {
                    None
                }
            }
            Entry::Vacant(_) => None,
        };

        tracing::debug!(session_id = %session_id, user_id = %user_id, "Connection removed");
        Some(SessionChange {
            connection,
            presence,
        })
    }

    pub fn get_user_connections(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.user_connections
            .get(&user_id)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|sid| self.connections.get(sid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of distinct users with at least one session
    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    fn deliver(connections: impl IntoIterator<Item = Arc<Connection>>, message: &GatewayMessage) -> usize {
        let mut sent = 0;
        for conn in connections {
            match conn.try_send(message.clone()) {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!(
                    session_id = %conn.session_id(),
                    error = %e,
                    "Dropping push for session"
                ),
            }
        }
        sent
    }
}

impl LiveDelivery for ConnectionRegistry {
    fn is_online(&self, user_id: Snowflake) -> bool {
        self.session_count(user_id) > 0
    }

    fn session_count(&self, user_id: Snowflake) -> usize {
        self.user_connections
            .get(&user_id)
            .map_or(0, |sessions| sessions.len())
    }

    fn send_to_user(&self, user_id: Snowflake, event: &DomainEvent) -> usize {
        let sent = Self::deliver(
            self.get_user_connections(user_id),
            &GatewayMessage::dispatch(event),
        );
        tracing::trace!(user_id = %user_id, event = event.event_type(), sent, "Event sent to user");
        sent
    }

    fn broadcast(&self, event: &DomainEvent) -> usize {
        let connections: Vec<Arc<Connection>> =
            self.connections.iter().map(|r| r.value().clone()).collect();
        let sent = Self::deliver(connections, &GatewayMessage::dispatch(event));
        tracing::debug!(event = event.event_type(), sent, "Event broadcast");
        sent
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .field("presence", &self.presence)
            .finish()
    }
}
