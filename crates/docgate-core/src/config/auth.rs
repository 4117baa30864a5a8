//! Authentication and permission-service configuration.

use serde::{Deserialize, Serialize};

/// Bearer-token verification and CMS permission lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// When `false`, requests are not authenticated (development only).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Shared HMAC secret for HS256 tokens. Used when `jwks_url` is empty.
    #[serde(default)]
    pub jwt_secret: String,
    /// JWKS endpoint of the identity provider (RS256 tokens, selected by `kid`).
    #[serde(default)]
    pub jwks_url: String,
    /// Expected `iss` claim. Empty disables the issuer check.
    #[serde(default)]
    pub issuer: String,
    /// Allowed clock skew in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Base URL of the CMS permission API (e.g. `https://cms.example.com/`).
    #[serde(default)]
    pub cms_api_url: String,
    /// Timeout for permission and JWKS lookups in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            jwt_secret: String::new(),
            jwks_url: String::new(),
            issuer: String::new(),
            leeway_seconds: default_leeway(),
            cms_api_url: String::new(),
            request_timeout_seconds: default_timeout(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_leeway() -> u64 {
    5
}

fn default_timeout() -> u64 {
    10
}
