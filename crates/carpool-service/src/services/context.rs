//! Service context - dependency container for services
//!
//! Holds all repositories, the live delivery registry, and the other
//! dependencies needed by services.

use std::sync::Arc;

use carpool_common::auth::{JwtService, PasswordService};
use carpool_core::traits::{
    LiveDelivery, MessageRepository, NotificationRepository, ReservationRepository,
    ReviewRepository, RideRepository, UserRepository, VehicleRepository,
};
use carpool_core::{Snowflake, SnowflakeGenerator};
use carpool_db::{
    MemoryMessageRepository, MemoryNotificationRepository, MemoryReservationRepository,
    MemoryReviewRepository, MemoryRideRepository, MemoryStore, MemoryUserRepository,
    MemoryVehicleRepository, PgMessageRepository, PgNotificationRepository, PgPool,
    PgReservationRepository, PgReviewRepository, PgRideRepository, PgUserRepository,
    PgVehicleRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Repositories (PostgreSQL or in-memory)
/// - Live delivery to connected push-channel sessions
/// - JWT and password services for authentication
/// - Snowflake generator for ID generation
#[derive(Clone)]
pub struct ServiceContext {
    // Present only for the PostgreSQL backend
    pool: Option<PgPool>,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    vehicle_repo: Arc<dyn VehicleRepository>,
    ride_repo: Arc<dyn RideRepository>,
    reservation_repo: Arc<dyn ReservationRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    message_repo: Arc<dyn MessageRepository>,
    review_repo: Arc<dyn ReviewRepository>,

    // Push channel
    live: Arc<dyn LiveDelivery>,

    // Services
    jwt_service: Arc<JwtService>,
    password_service: PasswordService,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    // === Database Pool ===

    /// The PostgreSQL pool, when running against a database
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Ping the database; the in-memory backend is always reachable
    pub async fn check_database(&self) -> bool {
        match &self.pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => true,
        }
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn vehicle_repo(&self) -> &dyn VehicleRepository {
        self.vehicle_repo.as_ref()
    }

    pub fn ride_repo(&self) -> &dyn RideRepository {
        self.ride_repo.as_ref()
    }

    pub fn reservation_repo(&self) -> &dyn ReservationRepository {
        self.reservation_repo.as_ref()
    }

    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn review_repo(&self) -> &dyn ReviewRepository {
        self.review_repo.as_ref()
    }

    // === Push channel ===

    /// Live sessions of connected users
    pub fn live(&self) -> &dyn LiveDelivery {
        self.live.as_ref()
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn password_service(&self) -> &PasswordService {
        &self.password_service
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("repositories", &"...")
            .field("snowflake_generator", &self.snowflake_generator)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    vehicle_repo: Option<Arc<dyn VehicleRepository>>,
    ride_repo: Option<Arc<dyn RideRepository>>,
    reservation_repo: Option<Arc<dyn ReservationRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    review_repo: Option<Arc<dyn ReviewRepository>>,
    live: Option<Arc<dyn LiveDelivery>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire every repository to PostgreSQL
    pub fn postgres(mut self, pool: PgPool) -> Self {
        self.user_repo = Some(Arc::new(PgUserRepository::new(pool.clone())));
        self.vehicle_repo = Some(Arc::new(PgVehicleRepository::new(pool.clone())));
        self.ride_repo = Some(Arc::new(PgRideRepository::new(pool.clone())));
        self.reservation_repo = Some(Arc::new(PgReservationRepository::new(pool.clone())));
        self.notification_repo = Some(Arc::new(PgNotificationRepository::new(pool.clone())));
        self.message_repo = Some(Arc::new(PgMessageRepository::new(pool.clone())));
        self.review_repo = Some(Arc::new(PgReviewRepository::new(pool.clone())));
        self.pool = Some(pool);
        self
    }

    /// Wire every repository to one shared in-memory store
    pub fn memory(mut self, store: &MemoryStore) -> Self {
        self.user_repo = Some(Arc::new(MemoryUserRepository::new(store.clone())));
        self.vehicle_repo = Some(Arc::new(MemoryVehicleRepository::new(store.clone())));
        self.ride_repo = Some(Arc::new(MemoryRideRepository::new(store.clone())));
        self.reservation_repo = Some(Arc::new(MemoryReservationRepository::new(store.clone())));
        self.notification_repo = Some(Arc::new(MemoryNotificationRepository::new(store.clone())));
        self.message_repo = Some(Arc::new(MemoryMessageRepository::new(store.clone())));
        self.review_repo = Some(Arc::new(MemoryReviewRepository::new(store.clone())));
        self.pool = None;
        self
    }

    pub fn live(mut self, live: Arc<dyn LiveDelivery>) -> Self {
        self.live = Some(live);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        Ok(ServiceContext {
            pool: self.pool,
            user_repo: required(self.user_repo, "user_repo")?,
            vehicle_repo: required(self.vehicle_repo, "vehicle_repo")?,
            ride_repo: required(self.ride_repo, "ride_repo")?,
            reservation_repo: required(self.reservation_repo, "reservation_repo")?,
            notification_repo: required(self.notification_repo, "notification_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            review_repo: required(self.review_repo, "review_repo")?,
            live: required(self.live, "live")?,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            password_service: PasswordService::new(),
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
        })
    }
}
