//! Durable side of presence
//!
//! The live connection count is kept by the gateway. This service records the
//! resulting online/offline transitions on the user and tells everyone else.

use carpool_core::{DomainEvent, Snowflake};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a transition and broadcast it.
    ///
    /// Returns `false` when a transition with a higher `seq` was already stored;
    /// nothing is broadcast in that case.
    #[instrument(skip(self))]
    pub async fn record(
        &self,
        user_id: Snowflake,
        is_online: bool,
        at: DateTime<Utc>,
        seq: i64,
    ) -> ServiceResult<bool> {
        let applied = self
            .ctx
            .user_repo()
            .set_presence(user_id, is_online, at, seq)
            .await?;

        if !applied {
            debug!(user_id = %user_id, seq, "Stale presence transition ignored");
            return Ok(false);
        }

        let reached = self
            .ctx
            .live()
            .broadcast(&DomainEvent::user_status(user_id, is_online, at));
        info!(user_id = %user_id, is_online, reached, "Presence changed");
        Ok(true)
    }
}
