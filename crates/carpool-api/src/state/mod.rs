//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the gateway state, and configuration.

use std::sync::Arc;

use axum::extract::FromRef;
use carpool_common::{AppConfig, JwtService};
use carpool_gateway::{ConnectionRegistry, GatewayState};
use carpool_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    gateway: GatewayState,
    config: Arc<AppConfig>,
}

impl AppState {
    /// `registry` must be the live delivery the context was built with
    pub fn new(
        service_context: ServiceContext,
        registry: Arc<ConnectionRegistry>,
        config: AppConfig,
    ) -> Self {
        let gateway = GatewayState::new(
            service_context.clone(),
            registry,
            config.gateway.heartbeat_interval_ms,
        );
        Self {
            service_context: Arc::new(service_context),
            gateway,
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn gateway(&self) -> &GatewayState {
        &self.gateway
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the JWT service from the service context
    pub fn jwt_service(&self) -> &JwtService {
        self.service_context.jwt_service()
    }
}

impl FromRef<AppState> for GatewayState {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("gateway", &self.gateway)
            .field("config", &"AppConfig")
            .finish()
    }
}
