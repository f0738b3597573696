//! In-memory UserRepository and VehicleRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use carpool_core::entities::{User, Vehicle};
use carpool_core::error::DomainError;
use carpool_core::traits::{RepoResult, UserRepository, VehicleRepository};
use carpool_core::value_objects::Snowflake;

use super::store::{MemoryStore, StoredUser};

#[derive(Clone, Debug)]
pub struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.store.lock().users.get(&id).map(|s| s.user.clone()))
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        let tables = self.store.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .map(|s| s.user.clone())
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .store
            .lock()
            .users
            .values()
            .find(|s| s.user.email.eq_ignore_ascii_case(email))
            .map(|s| s.user.clone()))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self
            .store
            .lock()
            .users
            .values()
            .any(|s| s.user.email.eq_ignore_ascii_case(email)))
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut tables = self.store.lock();
        if tables
            .users
            .values()
            .any(|s| s.user.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(DomainError::EmailAlreadyExists);
        }
        tables.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
                presence_seq: 0,
            },
        );
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(self
            .store
            .lock()
            .users
            .get(&id)
            .map(|s| s.password_hash.clone()))
    }

    async fn set_presence(
        &self,
        id: Snowflake,
        is_online: bool,
        at: DateTime<Utc>,
        seq: i64,
    ) -> RepoResult<bool> {
        let mut tables = self.store.lock();
        let stored = tables
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;

        if stored.presence_seq >= seq {
            return Ok(false);
        }
        stored.presence_seq = seq;
        stored.user.is_online = is_online;
        if !is_online {
            stored.user.last_active_at = Some(at);
        }
        Ok(true)
    }
}

#[derive(Clone, Debug)]
pub struct MemoryVehicleRepository {
    store: MemoryStore,
}

impl MemoryVehicleRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl VehicleRepository for MemoryVehicleRepository {
    async fn find_active_by_owner(&self, owner_id: Snowflake) -> RepoResult<Option<Vehicle>> {
        Ok(self
            .store
            .lock()
            .vehicles
            .values()
            .find(|v| v.owner_id == owner_id && !v.is_deleted)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Vehicle>> {
        let tables = self.store.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.vehicles.get(id))
            .cloned()
            .collect())
    }

    async fn create(&self, vehicle: &Vehicle) -> RepoResult<()> {
        let mut tables = self.store.lock();
        tables.require_user(vehicle.owner_id)?;
        tables.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn ensure_for_owner(&self, fallback: &Vehicle) -> RepoResult<Vehicle> {
        let mut tables = self.store.lock();
        tables.require_user(fallback.owner_id)?;
        if let Some(existing) = tables
            .vehicles
            .values()
            .find(|v| v.owner_id == fallback.owner_id && !v.is_deleted)
        {
            return Ok(existing.clone());
        }
        tables.vehicles.insert(fallback.id, fallback.clone());
        Ok(fallback.clone())
    }
}
