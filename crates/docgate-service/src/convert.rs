//! Manual conversion of uploaded documents into an editable format.
//!
//! Conversions run asynchronously on the document server; the client polls
//! by repeating the request until a new file name comes back.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use docgate_core::config::StorageConfig;
use docgate_core::error::{AppError, ErrorKind};
use docgate_core::result::AppResult;
use docgate_core::traits::{ConversionOutcome, ConversionRequest, DocumentService, PermissionChecker};
use docgate_core::types::{DocumentType, TopicId, base_name, extension, file_name};
use docgate_docservice::generate_revision_id;
use docgate_storage::{TopicLocks, TopicStore};

use crate::access::require_edit;
use crate::context::RequestContext;
use crate::links::StorageLinks;

/// Answer to a conversion poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConvertResult {
    /// Current file name: the original while pending, the new one when done.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Progress in percent while the conversion runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u8>,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConvertResult {
    fn done(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Default::default()
        }
    }

    fn pending(filename: impl Into<String>, step: u8) -> Self {
        Self {
            filename: Some(filename.into()),
            step: Some(step),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Converts stored documents into the internal format of their family.
#[derive(Debug, Clone)]
pub struct ConvertService {
    /// Current documents.
    topics: Arc<TopicStore>,
    /// Per-topic mutual exclusion.
    locks: Arc<TopicLocks>,
    /// Permission service.
    permissions: Arc<dyn PermissionChecker>,
    /// Document server.
    documents: Arc<dyn DocumentService>,
    /// Convertible formats.
    storage: StorageConfig,
}

impl ConvertService {
    /// Creates a new conversion service.
    pub fn new(
        topics: Arc<TopicStore>,
        locks: Arc<TopicLocks>,
        permissions: Arc<dyn PermissionChecker>,
        documents: Arc<dyn DocumentService>,
        storage: StorageConfig,
    ) -> Self {
        Self {
            topics,
            locks,
            permissions,
            documents,
            storage,
        }
    }

    /// Starts or polls the conversion of `requested` within `topic`.
    ///
    /// Permission and lookup failures are errors; conversion failures are
    /// reported inside the result so the polling client can show them.
    pub async fn convert(
        &self,
        ctx: &RequestContext,
        links: &StorageLinks,
        topic: &TopicId,
        requested: &str,
    ) -> AppResult<ConvertResult> {
        require_edit(self.permissions.as_ref(), ctx, topic).await?;

        let name = file_name(requested).to_string();
        if !self.topics.exists(topic, &name).await? {
            return Err(AppError::not_found(format!(
                "Document {name} not found in topic {topic}"
            )));
        }

        let ext = extension(&name);
        if !self.storage.is_convertible(&ext) {
            return Ok(ConvertResult::done(name));
        }

        let internal_ext = DocumentType::from_name(&name).internal_extension();
        let uri = links.file_uri(topic, &name);
        let request = ConversionRequest {
            revision_key: generate_revision_id(&uri),
            source_uri: uri,
            source_ext: ext,
            target_ext: internal_ext.to_string(),
            is_async: true,
        };

        let converted_uri = match self.documents.convert(&request).await {
            Ok(ConversionOutcome::Completed(uri)) => uri,
            Ok(ConversionOutcome::Pending { percent }) => {
                return Ok(ConvertResult::pending(name, percent));
            }
            Err(e) if e.kind == ErrorKind::ConversionTimeout => {
                return Ok(ConvertResult::pending(name, 0));
            }
            Err(e) => {
                warn!(topic = %topic, file = %name, error = %e, "Conversion failed");
                return Ok(ConvertResult::failed(e.message));
            }
        };

        let content = match self.documents.download(&converted_uri).await {
            Ok(content) => content,
            Err(e) => {
                warn!(topic = %topic, file = %name, error = %e, "Could not fetch converted document");
                return Ok(ConvertResult::failed("Server error"));
            }
        };

        let _guard = self.locks.lock(topic).await;
        let target = self
            .topics
            .correct_name(topic, &format!("{}{internal_ext}", base_name(&name)))
            .await?;
        self.topics.rename_document(topic, &name, &target).await?;
        self.topics.replace_document(topic, &target, &content).await?;

        info!(user = %ctx.user_id, topic = %topic, from = %name, to = %target, "Document converted");
        Ok(ConvertResult::done(target))
    }
}
