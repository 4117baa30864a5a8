//! `ServerLinks` extractor: the public base URL documents are published under.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use docgate_core::error::AppError;
use docgate_service::StorageLinks;

use crate::error::ApiError;
use crate::state::AppState;

/// Storage links rooted at this server's public URL.
///
/// `server.public_url` wins; otherwise the URL is rebuilt from
/// `X-Forwarded-Proto` and `Host`.
#[derive(Debug, Clone)]
pub struct ServerLinks(pub StorageLinks);

impl std::ops::Deref for ServerLinks {
    type Target = StorageLinks;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for ServerLinks {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let configured = state.config.server.public_url.trim_end_matches('/');
        if !configured.is_empty() {
            return Ok(ServerLinks(StorageLinks::new(configured)));
        }
        Ok(ServerLinks(StorageLinks::new(server_url_from(parts)?)))
    }
}

fn server_url_from(parts: &Parts) -> Result<String, AppError> {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let host = header("x-forwarded-host")
        .or_else(|| header("host"))
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .ok_or_else(|| AppError::validation("Missing Host header"))?;
    let scheme = header("x-forwarded-proto").unwrap_or_else(|| "http".to_string());

    Ok(format!("{scheme}://{host}"))
}
