//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] and orchestrates the
//! repositories and live delivery for one area of the application.

pub mod auth;
pub mod chat;
pub mod context;
pub mod error;
pub mod notification;
pub mod presence;
pub mod review;
pub mod ride;
pub mod user;

pub use auth::AuthService;
pub use chat::ChatService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use notification::NotificationService;
pub use presence::PresenceService;
pub use review::ReviewService;
pub use ride::RideService;
pub use user::UserService;
