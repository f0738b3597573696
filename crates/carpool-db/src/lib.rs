//! # carpool-db
//!
//! Data layer implementing the repository traits from `carpool-core`.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repository implementations
//! - An in-memory store implementing the same traits, for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carpool_db::pool::{create_pool, run_migrations};
//! use carpool_db::repositories::PgRideRepository;
//!
//! async fn example(config: &carpool_common::DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool).await?;
//!     let rides = PgRideRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{
    MemoryMessageRepository, MemoryNotificationRepository, MemoryReservationRepository,
    MemoryReviewRepository, MemoryRideRepository, MemoryStore, MemoryUserRepository,
    MemoryVehicleRepository,
};
pub use pool::{create_pool, run_migrations, PgPool};
pub use repositories::{
    PgMessageRepository, PgNotificationRepository, PgReservationRepository, PgReviewRepository,
    PgRideRepository, PgUserRepository, PgVehicleRepository,
};
