//! # Axum Helpers
//!
//! Shared building blocks for the pharmacy HTTP services.
//!
//! - **[`server`]**: router assembly with OpenAPI UIs, `/health`, readiness, graceful shutdown
//! - **[`http`]**: CORS and security-header layers
//! - **[`errors`]**: `AppError` and the `{code, error, message, details}` error body
//! - **[`extractors`]**: `ObjectIdPath` and `ValidatedJson`
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig};
//!
//! let config = ServerConfig::default();
//! let router = create_router::<ApiDoc>(api_routes, &config)?.merge(health_router(app_info!()));
//! create_production_app(router, &config, async {}).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{ObjectIdPath, ValidatedJson};
