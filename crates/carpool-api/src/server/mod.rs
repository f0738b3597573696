//! Server setup and initialization
//!
//! Builds the service context for the configured storage backend, wires the
//! gateway registry in as live delivery, and runs the HTTP server.

use std::sync::Arc;

use axum::Router;
use carpool_common::{AppConfig, AppError, JwtService, StorageBackend};
use carpool_core::SnowflakeGenerator;
use carpool_db::{create_pool, run_migrations, MemoryStore};
use carpool_gateway::ConnectionRegistry;
use carpool_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    apply_middleware(create_router(), state.config())
        .merge(health_routes())
        .with_state(state)
}

/// Initialize all dependencies and create `AppState`
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let builder = match config.database.backend {
        StorageBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&config.database)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            if config.database.run_migrations {
                run_migrations(&pool)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            ServiceContextBuilder::new().postgres(pool)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            ServiceContextBuilder::new().memory(&MemoryStore::new())
        }
    };

    let registry = ConnectionRegistry::new_shared();

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
        config.jwt.refresh_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = builder
        .live(registry.clone())
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, registry, config))
}

/// Serve the application on an already bound listener until ctrl-c
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{addr}");
        info!("Gateway listening on ws://{addr}/gateway");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();

    let state = create_app_state(config).await?;
    let app = create_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, app).await
}
