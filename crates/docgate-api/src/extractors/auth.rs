//! `AuthUser` extractor: pulls the bearer token from the Authorization header,
//! verifies it, and injects the request context.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use docgate_core::error::AppError;
use docgate_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Identity used for every request while authentication is disabled.
const ANONYMOUS_USER: &str = "anonymous";

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip_address = client_address(parts);

        let Some(verifier) = state.verifier.as_ref() else {
            return Ok(AuthUser(RequestContext::new(
                ANONYMOUS_USER,
                ANONYMOUS_USER,
                "",
                ip_address,
            )));
        };

        let token = bearer_token(parts)?;
        let claims = verifier.verify(token).await?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::authentication("Token carries no user identity"))?;
        let display_name = claims.display_name().unwrap_or(user_id);

        Ok(AuthUser(RequestContext::new(
            user_id,
            display_name,
            token,
            ip_address,
        )))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))
}

/// First `X-Forwarded-For` hop, else the peer address.
fn client_address(parts: &Parts) -> String {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
