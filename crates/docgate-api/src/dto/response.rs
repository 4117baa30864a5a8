//! Response DTOs.

use serde::{Deserialize, Serialize};

/// A stored document's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNameResponse {
    /// File name within the topic.
    pub filename: String,
}

/// Acknowledgement the document server expects from the callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackResponse {
    /// Always `0`; the server retries on anything else.
    pub error: i32,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}
