//! Application builder: wires stores, services and the router into an Axum app.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use docgate_auth::TokenVerifier;
use docgate_core::config::AppConfig;
use docgate_core::result::AppResult;
use docgate_core::traits::{DocumentService, PermissionChecker};
use docgate_service::{ConvertService, DocumentTracker, EditorService, TopicService};
use docgate_storage::{PathResolver, TopicLocks, TopicStore, VersionStore};

use crate::router::build_router;
use crate::state::AppState;

/// Creates the storage root and all services around the given collaborators.
pub async fn build_state(
    config: AppConfig,
    documents: Arc<dyn DocumentService>,
    permissions: Arc<dyn PermissionChecker>,
) -> AppResult<AppState> {
    // ── Step 1: Storage ──────────────────────────────────────────
    let paths = PathResolver::new(&config.storage.root_path);
    let topics = Arc::new(TopicStore::new(paths.clone(), &config.storage.trash_dir));
    topics.init().await?;
    let versions = Arc::new(VersionStore::new(paths));
    let locks = Arc::new(TopicLocks::new());
    info!(root = %config.storage.root_path, "Storage ready");

    // ── Step 2: Auth ─────────────────────────────────────────────
    let verifier = if config.auth.enabled {
        Some(Arc::new(TokenVerifier::new(&config.auth)?))
    } else {
        None
    };

    // ── Step 3: Services ─────────────────────────────────────────
    let topic_service = Arc::new(TopicService::new(
        Arc::clone(&topics),
        Arc::clone(&locks),
        Arc::clone(&permissions),
        config.storage.clone(),
    ));
    let editor_service = Arc::new(EditorService::new(
        Arc::clone(&topics),
        Arc::clone(&versions),
        Arc::clone(&permissions),
        config.storage.clone(),
        config.document_server.clone(),
    ));
    let convert_service = Arc::new(ConvertService::new(
        Arc::clone(&topics),
        Arc::clone(&locks),
        Arc::clone(&permissions),
        Arc::clone(&documents),
        config.storage.clone(),
    ));
    let tracker = Arc::new(DocumentTracker::new(topics, versions, locks, documents));

    Ok(AppState {
        config: Arc::new(config),
        verifier,
        topic_service,
        editor_service,
        convert_service,
        tracker,
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}
