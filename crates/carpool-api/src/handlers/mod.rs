//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod auth;
pub mod chat;
pub mod health;
pub mod notifications;
pub mod reviews;
pub mod rides;
pub mod users;
