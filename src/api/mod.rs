//! API module
//!
//! HTTP API endpoints and middleware.

mod extract;
pub mod middleware;
pub mod routes;

use std::time::Duration;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use routes::create_router;

/// Build the full application: `/health` plus the versioned API.
///
/// Layers run outermost first: trace, timeout, cors, context, logging.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let api_router = create_router().layer(
        ServiceBuilder::new()
            .layer(axum_middleware::from_fn(middleware::context_middleware))
            .layer(axum_middleware::from_fn(middleware::logging_middleware)),
    );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_router)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
