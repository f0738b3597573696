//! Notification dispatcher
//!
//! Notifications are persisted first and pushed to live sessions second. The
//! push is best-effort: an offline recipient finds the notification on the
//! next listing.

use std::collections::HashMap;

use carpool_core::entities::{Notification, NotificationType};
use carpool_core::traits::NotificationQuery;
use carpool_core::{DomainError, DomainEvent, NotificationEvent, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::{
    BulkDeleteNotificationsRequest, CountResponse, ListNotificationsQuery, NotificationResponse,
    UnreadCountResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Short-text event sent alongside `ReceiveNotification`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Companion {
    None,
    Booking,
    Cancellation,
}

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Persist a notification for one recipient and push it if they are online
    #[instrument(skip(self, title, message))]
    pub async fn create(
        &self,
        user_id: Snowflake,
        title: &str,
        message: &str,
        kind: NotificationType,
        related_ride_id: Option<Snowflake>,
        sender_id: Option<Snowflake>,
    ) -> ServiceResult<NotificationResponse> {
        let mut notification =
            Notification::new(self.ctx.generate_id(), user_id, title, message, kind);
        notification.related_ride_id = related_ride_id;
        notification.sender_id = sender_id;

        self.ctx.notification_repo().create(&notification).await?;
        self.push(&notification, Companion::None);

        let sender = match sender_id {
            Some(id) => self.ctx.user_repo().find_by_id(id).await?,
            None => None,
        };
        Ok(NotificationResponse::build(&notification, sender.as_ref()))
    }

    /// Push an already persisted notification to the recipient's live sessions.
    ///
    /// Returns how many sessions took it; zero simply means the recipient is offline.
    pub fn push(&self, notification: &Notification, companion: Companion) -> usize {
        let live = self.ctx.live();
        let user_id = notification.user_id;

        let delivered = live.send_to_user(
            user_id,
            &DomainEvent::ReceiveNotification(NotificationEvent::from(notification)),
        );

        let text = notification.message.clone();
        match companion {
            Companion::None => {}
            Companion::Booking => {
                live.send_to_user(user_id, &DomainEvent::ReceiveBookingNotification(text));
            }
            Companion::Cancellation => {
                live.send_to_user(user_id, &DomainEvent::ReceiveCancellationNotification(text));
            }
        }

        if delivered == 0 {
            debug!(user_id = %user_id, notification_id = %notification.id, "Recipient offline, notification kept for later");
        }
        delivered
    }

    /// Push a batch, e.g. every passenger of a cancelled ride
    pub fn push_all(&self, notifications: &[Notification], companion: Companion) {
        for notification in notifications {
            self.push(notification, companion);
        }
    }

    /// The recipient's notifications, newest first
    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        user_id: Snowflake,
        query: &ListNotificationsQuery,
    ) -> ServiceResult<Vec<NotificationResponse>> {
        let notifications = self
            .ctx
            .notification_repo()
            .list(
                user_id,
                &NotificationQuery {
                    unread_only: query.unread_only,
                    limit: query.limit,
                    offset: query.offset,
                },
            )
            .await?;

        self.with_senders(&notifications).await
    }

    #[instrument(skip(self))]
    pub async fn unread_count(&self, user_id: Snowflake) -> ServiceResult<UnreadCountResponse> {
        let unread_count = self.ctx.notification_repo().unread_count(user_id).await?;
        Ok(UnreadCountResponse { unread_count })
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, user_id: Snowflake, notification_id: Snowflake) -> ServiceResult<()> {
        self.require_owned(user_id, notification_id).await?;
        self.ctx.notification_repo().mark_read(notification_id).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: Snowflake) -> ServiceResult<CountResponse> {
        let count = self.ctx.notification_repo().mark_all_read(user_id).await?;
        info!(user_id = %user_id, count, "Notifications marked read");
        Ok(CountResponse { count })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Snowflake, notification_id: Snowflake) -> ServiceResult<()> {
        self.require_owned(user_id, notification_id).await?;
        self.ctx.notification_repo().delete(notification_id).await?;
        Ok(())
    }

    /// Delete several notifications. Ids that no longer exist are skipped; an
    /// id owned by someone else rejects the whole batch.
    #[instrument(skip(self, request), fields(requested = request.ids.len()))]
    pub async fn bulk_delete(
        &self,
        user_id: Snowflake,
        request: &BulkDeleteNotificationsRequest,
    ) -> ServiceResult<CountResponse> {
        let found = self.ctx.notification_repo().find_by_ids(&request.ids).await?;
        if found.iter().any(|n| !n.is_owned_by(user_id)) {
            return Err(DomainError::NotNotificationOwner.into());
        }

        let count = self
            .ctx
            .notification_repo()
            .delete_many(user_id, &request.ids)
            .await?;
        Ok(CountResponse { count })
    }

    #[instrument(skip(self))]
    pub async fn delete_all(&self, user_id: Snowflake) -> ServiceResult<CountResponse> {
        let count = self.ctx.notification_repo().delete_all(user_id).await?;
        info!(user_id = %user_id, count, "Notifications cleared");
        Ok(CountResponse { count })
    }

    async fn require_owned(
        &self,
        user_id: Snowflake,
        notification_id: Snowflake,
    ) -> ServiceResult<Notification> {
        let notification = self
            .ctx
            .notification_repo()
            .find_by_id(notification_id)
            .await?
            .ok_or(DomainError::NotificationNotFound(notification_id))?;

        if !notification.is_owned_by(user_id) {
            return Err(DomainError::NotNotificationOwner.into());
        }
        Ok(notification)
    }

    async fn with_senders(
        &self,
        notifications: &[Notification],
    ) -> ServiceResult<Vec<NotificationResponse>> {
        let mut sender_ids: Vec<Snowflake> =
            notifications.iter().filter_map(|n| n.sender_id).collect();
        sender_ids.sort_unstable();
        sender_ids.dedup();

        let senders: HashMap<_, _> = self
            .ctx
            .user_repo()
            .find_by_ids(&sender_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(notifications
            .iter()
            .map(|n| {
                let sender = n.sender_id.and_then(|id| senders.get(&id));
                NotificationResponse::build(n, sender)
            })
            .collect())
    }
}
