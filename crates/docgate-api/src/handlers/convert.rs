//! Manual conversion handler.

use axum::Json;
use axum::extract::{Query, State};

use docgate_core::error::AppError;
use docgate_service::ConvertResult;

use crate::dto::request::FileQuery;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ServerLinks};
use crate::handlers::parse_topic;
use crate::state::AppState;

/// GET /convert?topic=...&filename=...
pub async fn convert(
    State(state): State<AppState>,
    auth: AuthUser,
    links: ServerLinks,
    Query(query): Query<FileQuery>,
) -> Result<Json<ConvertResult>, ApiError> {
    let topic = parse_topic(query.topic.as_deref().unwrap_or_default())?;
    let filename = query
        .filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::validation("filename query parameter is required"))?;

    let result = state
        .convert_service
        .convert(&auth, &links, &topic, &filename)
        .await?;
    Ok(Json(result))
}
