//! In-memory collaborators for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use docgate_core::error::{AppError, ErrorKind};
use docgate_core::result::AppResult;
use docgate_core::traits::{
    CommandRequest, ConversionOutcome, ConversionRequest, DocumentService, PermissionChecker,
};
use docgate_core::types::TopicId;
use docgate_storage::{PathResolver, TopicLocks, TopicStore, VersionStore};

use crate::context::RequestContext;

/// Document server double serving canned downloads and conversion results.
#[derive(Debug, Default)]
pub struct MockDocuments {
    /// URI → content.
    files: Mutex<HashMap<String, Bytes>>,
    /// Result of every conversion; `None` answers `ConversionFailed`.
    conversion: Mutex<Option<Result<ConversionOutcome, ErrorKind>>>,
    /// Received conversion requests.
    pub conversions: Mutex<Vec<ConversionRequest>>,
    /// Received commands.
    pub commands: Mutex<Vec<CommandRequest>>,
    /// Optional latency added to every download.
    download_delay: Option<Duration>,
}

impl MockDocuments {
    pub fn with_file(self, uri: &str, data: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(uri.to_string(), Bytes::copy_from_slice(data));
        self
    }

    pub fn with_conversion(self, result: Result<ConversionOutcome, ErrorKind>) -> Self {
        *self.conversion.lock().unwrap() = Some(result);
        self
    }

    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = Some(delay);
        self
    }

    pub fn command_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentService for MockDocuments {
    async fn convert(&self, request: &ConversionRequest) -> AppResult<ConversionOutcome> {
        self.conversions.lock().unwrap().push(request.clone());
        match self.conversion.lock().unwrap().clone() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(kind)) => Err(AppError::new(kind, "mock conversion error")),
            None => Err(AppError::conversion_failed("no conversion configured")),
        }
    }

    async fn command(&self, command: &CommandRequest) -> AppResult<()> {
        self.commands.lock().unwrap().push(command.clone());
        Ok(())
    }

    async fn download(&self, uri: &str) -> AppResult<Bytes> {
        if let Some(delay) = self.download_delay {
            tokio::time::sleep(delay).await;
        }
        self.files
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or_else(|| AppError::external(format!("mock has no {uri}")))
    }
}

/// Permission double with fixed answers.
#[derive(Debug, Clone, Copy)]
pub struct MockPermissions {
    pub edit: bool,
    pub associated: bool,
}

impl MockPermissions {
    pub fn all() -> Self {
        Self {
            edit: true,
            associated: true,
        }
    }
}

#[async_trait]
impl PermissionChecker for MockPermissions {
    async fn is_allowed_to_edit(&self, _token: &str, _topic: &TopicId) -> AppResult<bool> {
        Ok(self.edit)
    }

    async fn is_associated_to(&self, _token: &str, _topic: &TopicId) -> AppResult<bool> {
        Ok(self.associated)
    }
}

/// Stores rooted in a temporary directory.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub topics: Arc<TopicStore>,
    pub versions: Arc<VersionStore>,
    pub locks: Arc<TopicLocks>,
}

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let paths = PathResolver::new(dir.path());
    Fixture {
        topics: Arc::new(TopicStore::new(paths.clone(), ".trash")),
        versions: Arc::new(VersionStore::new(paths)),
        locks: Arc::new(TopicLocks::new()),
        dir,
    }
}

pub fn topic(id: &str) -> TopicId {
    TopicId::parse(id).unwrap()
}

pub fn ctx() -> RequestContext {
    RequestContext::new("jane@example.com", "Jane", "token", "127.0.0.1")
}
