//! In-memory MessageRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use carpool_core::entities::Message;
use carpool_core::traits::{MessageRepository, RepoResult};
use carpool_core::value_objects::Snowflake;

use super::store::MemoryStore;

#[derive(Clone, Debug)]
pub struct MemoryMessageRepository {
    store: MemoryStore,
}

impl MemoryMessageRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let mut tables = self.store.lock();
        tables.require_user(message.sender_id)?;
        tables.require_user(message.receiver_id)?;
        tables.messages.push(message.clone());
        Ok(())
    }

    async fn conversation(&self, a: Snowflake, b: Snowflake) -> RepoResult<Vec<Message>> {
        let mut history: Vec<Message> = self
            .store
            .lock()
            .messages
            .iter()
            .filter(|m| m.is_between(a, b))
            .cloned()
            .collect();
        history.sort_by_key(|m| (m.timestamp, m.id));
        Ok(history)
    }

    async fn mark_conversation_read(
        &self,
        reader_id: Snowflake,
        other_id: Snowflake,
    ) -> RepoResult<u64> {
        let mut tables = self.store.lock();
        let mut changed = 0;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.sender_id == other_id && m.receiver_id == reader_id && !m.is_read)
        {
            message.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn contact_ids(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let tables = self.store.lock();
        let mut last_seen: HashMap<Snowflake, DateTime<Utc>> = HashMap::new();
        for message in tables
            .messages
            .iter()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
        {
            let entry = last_seen
                .entry(message.counterpart(user_id))
                .or_insert(message.timestamp);
            *entry = (*entry).max(message.timestamp);
        }

        let mut contacts: Vec<(Snowflake, DateTime<Utc>)> = last_seen.into_iter().collect();
        contacts.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(contacts.into_iter().map(|(id, _)| id).collect())
    }
}
