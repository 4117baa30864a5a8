//! Document server callback handler.

use axum::Json;
use axum::extract::{Query, State};
use bytes::Bytes;
use tracing::{info, warn};

use docgate_core::types::file_name;
use docgate_service::{TrackOutcome, TrackPayload};

use crate::dto::request::FileQuery;
use crate::dto::response::TrackResponse;
use crate::handlers::parse_topic;
use crate::state::AppState;

/// POST /track?topic=...&filename=...
///
/// Unauthenticated: the document server cannot present a user token.
/// Always acknowledged with `{"error":0}`; failures are logged.
pub async fn track(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
    body: Bytes,
) -> Json<TrackResponse> {
    let ack = Json(TrackResponse { error: 0 });

    let topic = match parse_topic(query.topic.as_deref().unwrap_or_default()) {
        Ok(topic) => topic,
        Err(e) => {
            warn!(error = %e.0, "Track notification for an invalid topic");
            return ack;
        }
    };

    let payload: TrackPayload = if body.iter().all(u8::is_ascii_whitespace) {
        TrackPayload::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(topic = %topic, error = %e, "Unreadable track notification");
                return ack;
            }
        }
    };

    let document = query
        .filename
        .as_deref()
        .map(file_name)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| topic.default_document());

    match state.tracker.handle(&topic, &document, &payload).await {
        Ok(TrackOutcome::Saved(report)) => info!(
            topic = %topic,
            file = %report.file,
            version = ?report.version,
            duplicate = report.duplicate,
            fallback = report.fallback,
            "Document saved"
        ),
        Ok(_) => {}
        Err(e) => warn!(topic = %topic, file = %document, error = %e, "Track notification failed"),
    }

    ack
}
