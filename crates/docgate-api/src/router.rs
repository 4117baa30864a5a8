//! Route definitions for the DocGate HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor. Stored documents are served read-only under `/storage`.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Headroom above the document size limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = usize::try_from(state.config.storage.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .merge(topic_routes())
        .merge(callback_routes())
        .merge(health_routes())
        .nest_service("/storage", storage_service(&state))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Topic lifecycle and editor configuration
fn topic_routes() -> Router<AppState> {
    Router::new()
        .route("/topic", post(handlers::topic::create))
        .route(
            "/topic/{id}",
            get(handlers::topic::editor_config)
                .post(handlers::topic::upload)
                .delete(handlers::topic::delete),
        )
        .route("/topic/{id}/exists", get(handlers::topic::exists))
}

/// Document server callback and manual conversion
fn callback_routes() -> Router<AppState> {
    Router::new()
        .route("/track", post(handlers::track::track))
        .route("/convert", get(handlers::convert::convert))
}

/// Liveness probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Static files the document server downloads: current documents, prev snapshots, diffs.
fn storage_service(state: &AppState) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(&state.config.storage.root_path))
        .layer(axum_middleware::from_fn(
            middleware::hidden::reject_hidden_paths,
        ))
}
