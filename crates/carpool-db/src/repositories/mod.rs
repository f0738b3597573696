//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in carpool-core.
//! Operations that touch several rows run inside one transaction.

mod error;
mod message;
mod notification;
mod reservation;
mod review;
mod ride;
mod user;
mod vehicle;

pub use message::PgMessageRepository;
pub use notification::PgNotificationRepository;
pub use reservation::PgReservationRepository;
pub use review::PgReviewRepository;
pub use ride::PgRideRepository;
pub use user::PgUserRepository;
pub use vehicle::PgVehicleRepository;
