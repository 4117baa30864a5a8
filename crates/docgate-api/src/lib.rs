//! # docgate-api
//!
//! HTTP API layer for DocGate built on Axum.
//!
//! Provides the topic, editor-callback and conversion endpoints, static
//! serving of the storage tree, middleware (CORS, logging, hidden-path
//! filtering), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
