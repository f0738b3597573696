//! Entity to model mappers
//!
//! - `From<Model> for Entity`: convert database rows to domain objects
//! - `*Insert` structs: prepare entity data for database writes

mod message;
mod notification;
mod reservation;
mod review;
mod ride;
mod user;
mod vehicle;

pub use user::UserInsert;
