//! In-memory NotificationRepository

use async_trait::async_trait;

use carpool_core::entities::Notification;
use carpool_core::error::DomainError;
use carpool_core::traits::{NotificationQuery, NotificationRepository, RepoResult};
use carpool_core::value_objects::Snowflake;

use super::store::MemoryStore;

#[derive(Clone, Debug)]
pub struct MemoryNotificationRepository {
    store: MemoryStore,
}

impl MemoryNotificationRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        self.store.lock().insert_notification(notification)
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>> {
        Ok(self.store.lock().notifications.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Notification>> {
        let tables = self.store.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.notifications.get(id))
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        user_id: Snowflake,
        query: &NotificationQuery,
    ) -> RepoResult<Vec<Notification>> {
        let tables = self.store.lock();
        let mut found: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && (!query.unread_only || !n.is_read))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let offset = usize::try_from(query.offset).unwrap_or(0);
        let limit = query
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        Ok(found.into_iter().skip(offset).take(limit).collect())
    }

    async fn unread_count(&self, user_id: Snowflake) -> RepoResult<i64> {
        let count = self
            .store
            .lock()
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count();
        Ok(count as i64)
    }

    async fn mark_read(&self, id: Snowflake) -> RepoResult<()> {
        let mut tables = self.store.lock();
        let notification = tables
            .notifications
            .get_mut(&id)
            .ok_or(DomainError::NotificationNotFound(id))?;
        notification.is_read = true;
        Ok(())
    }

    async fn mark_all_read(&self, user_id: Snowflake) -> RepoResult<u64> {
        let mut tables = self.store.lock();
        let mut changed = 0;
        for notification in tables
            .notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.store
            .lock()
            .notifications
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::NotificationNotFound(id))
    }

    async fn delete_many(&self, user_id: Snowflake, ids: &[Snowflake]) -> RepoResult<u64> {
        let mut tables = self.store.lock();
        let before = tables.notifications.len();
        tables
            .notifications
            .retain(|id, n| !(n.user_id == user_id && ids.contains(id)));
        Ok((before - tables.notifications.len()) as u64)
    }

    async fn delete_all(&self, user_id: Snowflake) -> RepoResult<u64> {
        let mut tables = self.store.lock();
        let before = tables.notifications.len();
        tables.notifications.retain(|_, n| n.user_id != user_id);
        Ok((before - tables.notifications.len()) as u64)
    }
}
