//! Domain entities - core business objects

mod message;
mod notification;
mod reservation;
mod review;
mod ride;
mod user;
mod vehicle;

pub use message::Message;
pub use notification::{Notification, NotificationType};
pub use reservation::Reservation;
pub use review::Review;
pub use ride::{cancellation_penalty, Ride, RideStatus};
pub use user::{User, UserKind, DEFAULT_REPUTATION};
pub use vehicle::Vehicle;
