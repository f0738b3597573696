//! Events pushed to live connections

mod domain_event;

pub use domain_event::{DomainEvent, MessageEvent, NotificationEvent, UserStatusChangedEvent};
