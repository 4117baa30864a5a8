//! Topic lifecycle: create, probe, upload into, and delete topics.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use docgate_core::config::StorageConfig;
use docgate_core::error::AppError;
use docgate_core::result::AppResult;
use docgate_core::traits::PermissionChecker;
use docgate_core::types::{TopicId, extension, file_name};
use docgate_storage::{FileMetadata, TopicLocks, TopicStore};

use crate::access::{require_associated, require_edit};
use crate::context::RequestContext;

/// Manages topics and their documents.
#[derive(Debug, Clone)]
pub struct TopicService {
    /// Current documents.
    topics: Arc<TopicStore>,
    /// Per-topic mutual exclusion.
    locks: Arc<TopicLocks>,
    /// Permission service.
    permissions: Arc<dyn PermissionChecker>,
    /// Template, size limit and supported formats.
    storage: StorageConfig,
}

impl TopicService {
    /// Creates a new topic service.
    pub fn new(
        topics: Arc<TopicStore>,
        locks: Arc<TopicLocks>,
        permissions: Arc<dyn PermissionChecker>,
        storage: StorageConfig,
    ) -> Self {
        Self {
            topics,
            locks,
            permissions,
            storage,
        }
    }

    /// Creates the topic's document from the configured template.
    ///
    /// Fails with `Conflict` if the topic already has its document.
    pub async fn create(&self, ctx: &RequestContext, topic: &TopicId) -> AppResult<String> {
        require_associated(self.permissions.as_ref(), ctx, topic).await?;

        let name = topic.default_document();
        let template = Some(PathBuf::from(&self.storage.template_path))
            .filter(|p| !p.as_os_str().is_empty());
        let metadata = FileMetadata::new(&ctx.user_id, &ctx.display_name);

        let _guard = self.locks.lock(topic).await;
        self.topics
            .create_document(topic, &name, template.as_deref(), &metadata)
            .await?;

        info!(user = %ctx.user_id, topic = %topic, file = %name, "Topic created");
        Ok(name)
    }

    /// Whether the topic has its document.
    pub async fn exists(&self, topic: &TopicId) -> AppResult<bool> {
        self.topics.exists(topic, &topic.default_document()).await
    }

    /// Moves the topic with all documents and history into the trash.
    pub async fn delete(&self, ctx: &RequestContext, topic: &TopicId) -> AppResult<()> {
        require_edit(self.permissions.as_ref(), ctx, topic).await?;

        let guard = self.locks.lock(topic).await;
        let target = self.topics.move_to_trash(topic).await?;
        drop(guard);
        self.locks.prune();

        info!(user = %ctx.user_id, topic = %topic, trash = %target.display(), "Topic deleted");
        Ok(())
    }

    /// Stores an uploaded document under a non-colliding name and returns that name.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        topic: &TopicId,
        original_name: &str,
        data: Bytes,
    ) -> AppResult<String> {
        require_edit(self.permissions.as_ref(), ctx, topic).await?;

        let name = file_name(original_name).trim();
        if name.is_empty() {
            return Err(AppError::validation("Uploaded file has no name"));
        }

        let size = data.len() as u64;
        if size == 0 || size > self.storage.max_file_size {
            return Err(AppError::validation("File size is incorrect"));
        }

        if !self.storage.is_supported(&extension(name)) {
            return Err(AppError::validation("File type is not supported"));
        }

        let _guard = self.locks.lock(topic).await;
        let stored = self.topics.correct_name(topic, name).await?;
        self.topics.replace_document(topic, &stored, &data).await?;
        self.topics
            .write_metadata(
                topic,
                &stored,
                &FileMetadata::new(&ctx.user_id, &ctx.display_name),
            )
            .await?;

        info!(user = %ctx.user_id, topic = %topic, file = %stored, bytes = size, "Document uploaded");
        Ok(stored)
    }
}
