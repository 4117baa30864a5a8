//! Topic handlers: editor configuration, existence, creation, deletion, upload.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use bytes::Bytes;
use validator::Validate;

use docgate_core::error::AppError;
use docgate_service::{EditorConfig, EditorOptions};

use crate::dto::request::{CreateTopicRequest, EditorQuery};
use crate::dto::response::FileNameResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ServerLinks};
use crate::handlers::parse_topic;
use crate::state::AppState;

/// Multipart field carrying the uploaded document.
const UPLOAD_FIELD: &str = "uploadedFile";

/// GET /topic/{id}
pub async fn editor_config(
    State(state): State<AppState>,
    auth: AuthUser,
    links: ServerLinks,
    Path(id): Path<String>,
    Query(query): Query<EditorQuery>,
) -> Result<Json<EditorConfig>, ApiError> {
    let topic = parse_topic(&id)?;
    let options = EditorOptions {
        mode: query.mode,
        kind: query.kind,
        lang: query.lang,
    };

    let config = state
        .editor_service
        .editor_config(&auth, &links, &topic, &options)
        .await?;
    Ok(Json(config))
}

/// GET /topic/{id}/exists
pub async fn exists(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let topic = parse_topic(&id)?;
    if state.topic_service.exists(&topic).await? {
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// POST /topic
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTopicRequest>,
) -> Result<Json<FileNameResponse>, ApiError> {
    req.validate()
        .map_err(|_| AppError::validation("No Topic id given"))?;
    let topic = parse_topic(&req.topic_id)?;

    let filename = state.topic_service.create(&auth, &topic).await?;
    Ok(Json(FileNameResponse { filename }))
}

/// DELETE /topic/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let topic = parse_topic(&id)?;
    state.topic_service.delete(&auth, &topic).await?;
    Ok(StatusCode::OK)
}

/// POST /topic/{id} (multipart, field `uploadedFile`)
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<FileNameResponse>, ApiError> {
    let topic = parse_topic(&id)?;

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
        upload = Some((name, data));
    }

    let (name, data) =
        upload.ok_or_else(|| AppError::validation(format!("Missing {UPLOAD_FIELD} field")))?;

    let filename = state
        .topic_service
        .upload(&auth, &topic, &name, data)
        .await?;
    Ok(Json(FileNameResponse { filename }))
}
