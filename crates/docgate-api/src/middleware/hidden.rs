//! Keeps dot-prefixed entries of the storage tree (the trash, temp files) private.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Answers 404 for any path with a segment starting with `.`.
pub async fn reject_hidden_paths(request: Request, next: Next) -> Response {
    if is_hidden(request.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

fn is_hidden(path: &str) -> bool {
    let decoded = urlencoding::decode(path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_string());
    decoded
        .split(['/', '\\'])
        .any(|segment| segment.starts_with('.'))
}
