//! Request context carrying the authenticated user and the caller's address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context for the current authenticated request.
///
/// Extracted by the API layer and passed into service methods so that
/// every operation knows *who* is acting and with *which* token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID (login name).
    pub user_id: String,
    /// Name shown to co-editors.
    pub display_name: String,
    /// Bearer token, forwarded to the permission service.
    #[serde(skip_serializing)]
    pub token: String,
    /// IP address of the request origin.
    pub ip_address: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        token: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            token: token.into(),
            ip_address: ip_address.into(),
            request_time: Utc::now(),
        }
    }

    /// The caller's address reduced to `[0-9a-zA-Z.=]`, as the editor expects it.
    pub fn host_address(&self) -> String {
        self.ip_address
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '=' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}
