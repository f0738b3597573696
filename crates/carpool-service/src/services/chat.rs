//! Messaging channel
//!
//! Direct messages between two users. A message is stored before any push is
//! attempted; a failed insert aborts the send with nothing delivered.

use std::collections::HashMap;

use carpool_core::entities::{Message, User};
use carpool_core::{DomainError, DomainEvent, MessageEvent, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::{ContactResponse, CountResponse, MessageResponse, SendMessageRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Chat service
pub struct ChatService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChatService<'a> {
    /// Create a new ChatService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store a message and push it to the receiver if they have a live session
    #[instrument(skip(self, request), fields(receiver_id = %request.receiver_id))]
    pub async fn send(
        &self,
        sender_id: Snowflake,
        request: &SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let content = request.content.trim();
        if content.is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }

        self.require_user(sender_id).await?;
        self.require_user(request.receiver_id).await?;

        let message = Message::new(
            self.ctx.generate_id(),
            sender_id,
            request.receiver_id,
            content.to_string(),
        );
        self.ctx.message_repo().create(&message).await?;

        let live = self.ctx.live();
        if live.is_online(message.receiver_id) {
            let sessions = live.send_to_user(
                message.receiver_id,
                &DomainEvent::ReceiveMessage(MessageEvent::from(&message)),
            );
            debug!(message_id = %message.id, sessions, "Message pushed");
        }

        info!(message_id = %message.id, sender_id = %sender_id, "Message sent");
        Ok(MessageResponse::from(&message))
    }

    /// Both directions of a conversation, oldest first
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        user_id: Snowflake,
        other_id: Snowflake,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let messages = self.ctx.message_repo().conversation(user_id, other_id).await?;
        Ok(messages.iter().map(MessageResponse::from).collect())
    }

    /// Mark everything `other_id` sent to `reader_id` as read
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        reader_id: Snowflake,
        other_id: Snowflake,
    ) -> ServiceResult<CountResponse> {
        let count = self
            .ctx
            .message_repo()
            .mark_conversation_read(reader_id, other_id)
            .await?;
        Ok(CountResponse { count })
    }

    /// Everyone the user has exchanged messages with, most recent first
    #[instrument(skip(self))]
    pub async fn contacts(&self, user_id: Snowflake) -> ServiceResult<Vec<ContactResponse>> {
        let ids = self.ctx.message_repo().contact_ids(user_id).await?;
        let mut users: HashMap<Snowflake, User> = self
            .ctx
            .user_repo()
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let live = self.ctx.live();
        Ok(ids
            .iter()
            .filter_map(|id| users.remove(id))
            .map(|user| ContactResponse::from_user(&user, live.is_online(user.id)))
            .collect())
    }

    /// Contact card for a user, whether or not there is any history yet
    #[instrument(skip(self))]
    pub async fn contact(&self, user_id: Snowflake) -> ServiceResult<ContactResponse> {
        let user = self.require_user(user_id).await?;
        Ok(ContactResponse::from_user(
            &user,
            self.ctx.live().is_online(user.id),
        ))
    }

    async fn require_user(&self, user_id: Snowflake) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?)
    }
}
