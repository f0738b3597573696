//! Database models - SQLx-compatible structs for PostgreSQL tables

mod message;
mod notification;
mod reservation;
mod review;
mod ride;
mod user;
mod vehicle;

pub use message::MessageModel;
pub use notification::NotificationModel;
pub use reservation::ReservationModel;
pub use review::{RatingSummaryModel, ReviewModel};
pub use ride::RideModel;
pub use user::UserModel;
pub use vehicle::VehicleModel;
