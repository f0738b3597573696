//! Integration test utilities for BanuPool
//!
//! Helpers for running end-to-end tests against the REST API and the
//! WebSocket gateway of an in-process server.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
