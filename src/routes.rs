//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health` - Health check: storage, event queue (not rate limited)
//! - `/api/*`       - REST API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket, stricter on anonymous writes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::rate_limit::{self, ClientIpSource};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Rate limiting reads the client IP from `X-Forwarded-For` / `X-Real-IP`
/// when `state.behind_proxy` is set, otherwise from the peer socket address,
/// so the server must be started with connect info.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let source = ClientIpSource::from_behind_proxy(state.behind_proxy);

    let api_router = rate_limit::apply(api::routes::api_routes(Some(source)), source);

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// The same routes without rate limiting, for in-process tests and tools
/// that do not provide a peer address.
pub fn unlimited_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::routes::api_routes(None))
        .with_state(state)
}
