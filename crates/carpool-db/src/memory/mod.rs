//! In-memory repositories
//!
//! Every repository shares one [`MemoryStore`]; each operation takes the
//! store lock once, which makes multi-row changes atomic the same way a
//! database transaction does. Backs `STORAGE_BACKEND=memory` and the
//! service-level tests.

mod message;
mod notification;
mod review;
mod ride;
mod store;
mod user;

pub use message::MemoryMessageRepository;
pub use notification::MemoryNotificationRepository;
pub use review::MemoryReviewRepository;
pub use ride::{MemoryReservationRepository, MemoryRideRepository};
pub use store::MemoryStore;
pub use user::{MemoryUserRepository, MemoryVehicleRepository};
