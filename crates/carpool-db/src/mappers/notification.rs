//! Notification entity <-> model mapper

use carpool_core::entities::{Notification, NotificationType};
use carpool_core::value_objects::Snowflake;

use crate::models::NotificationModel;

impl From<NotificationModel> for Notification {
    fn from(model: NotificationModel) -> Self {
        Notification {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            sender_id: model.sender_id.map(Snowflake::new),
            title: model.title,
            message: model.message,
            kind: NotificationType::parse(&model.kind).unwrap_or_default(),
            related_ride_id: model.related_ride_id.map(Snowflake::new),
            is_read: model.is_read,
            created_at: model.created_at,
        }
    }
}
