//! Topic permissions answered by the CMS API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use docgate_core::config::AuthConfig;
use docgate_core::error::{AppError, ErrorKind};
use docgate_core::result::AppResult;
use docgate_core::traits::PermissionChecker;
use docgate_core::types::TopicId;

/// Permission endpoints exposed by the CMS.
#[derive(Debug, Clone, Copy)]
enum Permission {
    AllowedToEdit,
    AssociatedTo,
}

impl Permission {
    fn path_segment(self) -> &'static str {
        match self {
            Self::AllowedToEdit => "IsAllowedToEdit",
            Self::AssociatedTo => "IsAssociatedTo",
        }
    }
}

/// [`PermissionChecker`] that asks the CMS with the caller's own bearer token.
///
/// HTTP 200 grants the permission; any other status denies it.
#[derive(Debug, Clone)]
pub struct CmsPermissionClient {
    /// HTTP client.
    http: Client,
    /// CMS base URL, always ending in `/`.
    base_url: String,
}

impl CmsPermissionClient {
    /// Creates a client from auth configuration.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        if config.cms_api_url.is_empty() {
            return Err(AppError::configuration("auth.cms_api_url is not set"));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build CMS HTTP client",
                    e,
                )
            })?;

        let mut base_url = config.cms_api_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { http, base_url })
    }

    fn url(&self, topic: &TopicId, permission: Permission) -> String {
        format!(
            "{}Api/Permissions/Topics/{}/Permission/{}",
            self.base_url,
            topic,
            permission.path_segment()
        )
    }

    async fn check(&self, token: &str, topic: &TopicId, permission: Permission) -> AppResult<bool> {
        let response = self
            .http
            .get(self.url(topic, permission))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                warn!(topic = %topic, permission = permission.path_segment(), error = %e, "Permission check failed");
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Permission service unreachable: {e}"),
                    e,
                )
            })?;

        let granted = response.status() == StatusCode::OK;
        debug!(
            topic = %topic,
            permission = permission.path_segment(),
            status = response.status().as_u16(),
            granted,
            "Permission checked"
        );
        Ok(granted)
    }
}

#[async_trait]
impl PermissionChecker for CmsPermissionClient {
    async fn is_allowed_to_edit(&self, token: &str, topic: &TopicId) -> AppResult<bool> {
        self.check(token, topic, Permission::AllowedToEdit).await
    }

    async fn is_associated_to(&self, token: &str, topic: &TopicId) -> AppResult<bool> {
        self.check(token, topic, Permission::AssociatedTo).await
    }
}

/// [`PermissionChecker`] that grants everything.
///
/// Only wired in when authentication is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnrestrictedPermissions;

#[async_trait]
impl PermissionChecker for UnrestrictedPermissions {
    async fn is_allowed_to_edit(&self, _token: &str, _topic: &TopicId) -> AppResult<bool> {
        Ok(true)
    }

    async fn is_associated_to(&self, _token: &str, _topic: &TopicId) -> AppResult<bool> {
        Ok(true)
    }
}
