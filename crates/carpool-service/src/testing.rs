//! Test fixtures shared by the service tests

use std::collections::HashMap;
use std::sync::Arc;

use carpool_common::JwtService;
use carpool_core::{DomainEvent, LiveDelivery, Snowflake, User, UserKind};
use carpool_db::MemoryStore;
use parking_lot::Mutex;

use crate::services::{ServiceContext, ServiceContextBuilder};

/// Where a recorded push went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    User(Snowflake),
    Everyone,
}

/// Live delivery double: fake sessions plus a log of every push
#[derive(Default)]
pub struct RecordingDelivery {
    sessions: Mutex<HashMap<Snowflake, usize>>,
    sent: Mutex<Vec<(Target, DomainEvent)>>,
}

impl RecordingDelivery {
    pub fn connect(&self, user_id: Snowflake) {
        *self.sessions.lock().entry(user_id).or_default() += 1;
    }

    pub fn sent(&self) -> Vec<(Target, DomainEvent)> {
        self.sent.lock().clone()
    }

    /// Event names pushed to one user, in order
    pub fn events_for(&self, user_id: Snowflake) -> Vec<&'static str> {
        self.sent
            .lock()
            .iter()
            .filter(|(target, _)| *target == Target::User(user_id))
            .map(|(_, event)| event.event_type())
            .collect()
    }
}

impl LiveDelivery for RecordingDelivery {
    fn is_online(&self, user_id: Snowflake) -> bool {
        self.session_count(user_id) > 0
    }

    fn session_count(&self, user_id: Snowflake) -> usize {
        self.sessions.lock().get(&user_id).copied().unwrap_or(0)
    }

    fn send_to_user(&self, user_id: Snowflake, event: &DomainEvent) -> usize {
        let sessions = self.session_count(user_id);
        if sessions > 0 {
            self.sent.lock().push((Target::User(user_id), event.clone()));
        }
        sessions
    }

    fn broadcast(&self, event: &DomainEvent) -> usize {
        self.sent.lock().push((Target::Everyone, event.clone()));
        self.sessions.lock().values().sum()
    }
}

/// A context over a fresh in-memory store
pub struct TestEnv {
    pub store: MemoryStore,
    pub live: Arc<RecordingDelivery>,
    pub ctx: ServiceContext,
}

impl TestEnv {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let live = Arc::new(RecordingDelivery::default());
        let ctx = ServiceContextBuilder::new()
            .memory(&store)
            .live(live.clone())
            .jwt_service(Arc::new(JwtService::new(
                "test-secret-key-at-least-32-bytes!!",
                3600,
                86400,
            )))
            .build()
            .expect("memory context");
        Self { store, live, ctx }
    }

    /// Insert a student directly through the repository
    pub async fn user(&self, first_name: &str) -> User {
        let id = self.ctx.generate_id();
        let user = User::new(
            id,
            first_name.to_string(),
            "Test".to_string(),
            format!("{}.{id}@ogr.bandirma.edu.tr", first_name.to_lowercase()),
            "5550000000".to_string(),
            UserKind::Student {
                student_number: id.to_string(),
            },
        );
        self.ctx
            .user_repo()
            .create(&user, "not-a-real-hash")
            .await
            .expect("seed user");
        user
    }

    pub async fn reload(&self, user_id: Snowflake) -> User {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await
            .expect("lookup")
            .expect("user exists")
    }
}
