//! # carpool-service
//!
//! Application layer containing the ride lifecycle engine, the notification
//! dispatcher, chat and presence services, and the DTOs they speak.

pub mod dto;
pub mod services;

pub use services::{
    AuthService, ChatService, NotificationService, PresenceService, ReviewService, RideService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};

#[cfg(test)]
pub(crate) mod testing;
