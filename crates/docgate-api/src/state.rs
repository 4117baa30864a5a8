//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use docgate_auth::TokenVerifier;
use docgate_core::config::AppConfig;
use docgate_service::{ConvertService, DocumentTracker, EditorService, TopicService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer-token verifier; `None` when authentication is disabled
    pub verifier: Option<Arc<TokenVerifier>>,

    // ── Services ─────────────────────────────────────────────
    /// Topic create/exists/delete/upload
    pub topic_service: Arc<TopicService>,
    /// Editor configuration
    pub editor_service: Arc<EditorService>,
    /// Manual conversion
    pub convert_service: Arc<ConvertService>,
    /// Editor status notifications
    pub tracker: Arc<DocumentTracker>,
}
