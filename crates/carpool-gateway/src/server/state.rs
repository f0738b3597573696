//! Gateway state
//!
//! Shared dependencies for the WebSocket handler.

use std::sync::Arc;
use std::time::Duration;

use carpool_service::ServiceContext;

use crate::connection::ConnectionRegistry;

/// Gateway application state
///
/// The registry here must be the same instance the service context pushes
/// through, otherwise pushes never reach these sessions.
#[derive(Clone)]
pub struct GatewayState {
    service_context: Arc<ServiceContext>,
    registry: Arc<ConnectionRegistry>,
    heartbeat_interval_ms: u64,
}

impl GatewayState {
    pub fn new(
        service_context: ServiceContext,
        registry: Arc<ConnectionRegistry>,
        heartbeat_interval_ms: u64,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            registry,
            heartbeat_interval_ms,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Interval announced in Hello
    pub fn heartbeat_interval_ms(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// A session is dropped after missing two heartbeat intervals
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.saturating_mul(2))
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("heartbeat_interval_ms", &self.heartbeat_interval_ms)
            .finish()
    }
}
