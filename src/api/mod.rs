//! API module
//!
//! Contains HTTP request handlers for the review service and the router
//! that wires them together.

pub mod analyze;
pub mod health;
pub mod middleware;

pub use analyze::analyze;
pub use health::health;

use crate::state::SharedState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        // Proposals of any length are accepted
        .layer(DefaultBodyLimit::disable())
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        // Browser frontends call the API from other origins
        .layer(CorsLayer::permissive())
        .with_state(state)
}
