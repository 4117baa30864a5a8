//! Contract of the external document server (editor callbacks, conversion, commands).

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A request to convert a document between formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// URL the document server downloads the source from.
    pub source_uri: String,
    /// Source extension with leading dot (e.g. `.odt`).
    pub source_ext: String,
    /// Target extension with leading dot (e.g. `.docx`).
    pub target_ext: String,
    /// Revision key; the document server caches conversions by this key.
    pub revision_key: String,
    /// When `true` the server answers immediately with progress instead of blocking.
    pub is_async: bool,
}

/// Result of a conversion request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Conversion finished; the converted document can be fetched from this URL.
    Completed(String),
    /// Conversion still running; poll again later.
    Pending {
        /// Progress in percent (0-99).
        percent: u8,
    },
}

/// Commands understood by the document server's command service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    /// Ask the server to save the document identified by `key` now.
    ForceSave {
        /// Editing-session key.
        key: String,
    },
}

impl CommandRequest {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ForceSave { .. } => "forcesave",
        }
    }

    /// Document key the command targets.
    pub fn key(&self) -> &str {
        match self {
            Self::ForceSave { key } => key,
        }
    }
}

/// Client for the external document server.
///
/// Conversion failures are reported as `ErrorKind::ConversionTimeout`
/// (not ready yet, retryable) or `ErrorKind::ConversionFailed`.
#[async_trait]
pub trait DocumentService: Send + Sync + std::fmt::Debug + 'static {
    /// Request a conversion.
    async fn convert(&self, request: &ConversionRequest) -> AppResult<ConversionOutcome>;

    /// Issue a command (e.g. force-save).
    async fn command(&self, command: &CommandRequest) -> AppResult<()>;

    /// Download a document or change package from the document server.
    async fn download(&self, uri: &str) -> AppResult<Bytes>;
}
