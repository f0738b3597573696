//! Message entity <-> model mapper

use carpool_core::entities::Message;
use carpool_core::value_objects::Snowflake;

use crate::models::MessageModel;

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            content: model.content,
            timestamp: model.sent_at,
            is_read: model.is_read,
        }
    }
}
