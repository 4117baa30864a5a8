//! Topic-level file operations: documents, metadata sidecars, and trash.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, info};

use docgate_core::error::{AppError, ErrorKind};
use docgate_core::result::AppResult;
use docgate_core::types::{TopicId, base_name, extension, file_name};

use crate::metadata::FileMetadata;
use crate::paths::{PathResolver, dir_exists, ensure_dir, file_exists, write_atomic};

/// Stores the current documents of topics.
#[derive(Debug, Clone)]
pub struct TopicStore {
    /// Path resolver shared with the version store.
    paths: PathResolver,
    /// Trash directory name relative to the storage root.
    trash_name: String,
}

impl TopicStore {
    /// Creates a topic store.
    pub fn new(paths: PathResolver, trash_name: impl Into<String>) -> Self {
        Self {
            paths,
            trash_name: trash_name.into(),
        }
    }

    /// Creates the storage root and trash directory.
    pub async fn init(&self) -> AppResult<()> {
        ensure_dir(self.paths.root()).await?;
        ensure_dir(&self.paths.trash_dir(&self.trash_name)).await
    }

    /// The underlying path resolver.
    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Whether a document exists in the topic.
    pub async fn exists(&self, topic: &TopicId, name: &str) -> AppResult<bool> {
        file_exists(&self.paths.file_path(name, topic)).await
    }

    /// Returns `name`, or `base (1).ext`, `base (2).ext`, whichever is free first.
    pub async fn correct_name(&self, topic: &TopicId, name: &str) -> AppResult<String> {
        let base = base_name(name);
        let ext = extension(name);
        let mut candidate = format!("{base}{ext}");
        let mut index = 1;

        while file_exists(&self.paths.file_path(&candidate, topic)).await? {
            candidate = format!("{base} ({index}){ext}");
            index += 1;
        }

        Ok(candidate)
    }

    /// Creates a new document from `template` (or empty) and records its metadata.
    ///
    /// Fails with `Conflict` if the document already exists.
    pub async fn create_document(
        &self,
        topic: &TopicId,
        name: &str,
        template: Option<&Path>,
        metadata: &FileMetadata,
    ) -> AppResult<PathBuf> {
        let path = self.paths.storage_path(name, topic).await?;
        if file_exists(&path).await? {
            return Err(AppError::conflict(format!(
                "Document {name} already exists in topic {topic}"
            )));
        }

        let content = match template {
            Some(template) => fs::read(template).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to read template: {}", template.display()),
                    e,
                )
            })?,
            None => Vec::new(),
        };

        write_atomic(&path, &content).await?;
        self.write_metadata(topic, name, metadata).await?;

        info!(topic = %topic, file = name, "Created document");
        Ok(path)
    }

    /// Reads the current content of a document.
    pub async fn read_document(&self, topic: &TopicId, name: &str) -> AppResult<Bytes> {
        let path = self.paths.file_path(name, topic);
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::not_found(
                format!("Document {name} not found in topic {topic}"),
            )),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read document {name}"),
                e,
            )),
        }
    }

    /// Replaces a document's content via a temporary file and rename.
    pub async fn replace_document(&self, topic: &TopicId, name: &str, data: &[u8]) -> AppResult<()> {
        let path = self.paths.storage_path(name, topic).await?;
        write_atomic(&path, data).await?;
        debug!(topic = %topic, file = name, bytes = data.len(), "Replaced document");
        Ok(())
    }

    /// Modification time of a document.
    pub async fn modified(&self, topic: &TopicId, name: &str) -> AppResult<DateTime<Utc>> {
        let path = self.paths.file_path(name, topic);
        let meta = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Document {name} not found in topic {topic}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to stat {name}"), e)
            }
        })?;
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Ok(DateTime::<Utc>::from(modified))
    }

    /// Writes the metadata sidecar, creating the history root.
    pub async fn write_metadata(
        &self,
        topic: &TopicId,
        name: &str,
        metadata: &FileMetadata,
    ) -> AppResult<()> {
        ensure_dir(&self.paths.history_root_path(name, topic)).await?;
        let path = self.paths.metadata_path(name, topic);
        fs::write(&path, metadata.encode()).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write metadata for {name}"),
                e,
            )
        })
    }

    /// Reads the metadata sidecar, if present.
    pub async fn read_metadata(
        &self,
        topic: &TopicId,
        name: &str,
    ) -> AppResult<Option<FileMetadata>> {
        let path = self.paths.metadata_path(name, topic);
        match fs::read_to_string(&path).await {
            Ok(raw) => FileMetadata::parse(&raw).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read metadata for {name}"),
                e,
            )),
        }
    }

    /// Renames a document together with its history directory and sidecar.
    pub async fn rename_document(&self, topic: &TopicId, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.paths.file_path(from, topic);
        let to_path = self.paths.file_path(to, topic);
        if file_exists(&to_path).await? {
            return Err(AppError::conflict(format!(
                "Document {to} already exists in topic {topic}"
            )));
        }
        rename(&from_path, &to_path).await?;

        let from_history = self.paths.history_root_path(from, topic);
        if dir_exists(&from_history).await? {
            let to_history = self.paths.history_root_path(to, topic);
            rename(&from_history, &to_history).await?;

            let old_sidecar = to_history.join(format!("{}.txt", file_name(from)));
            if file_exists(&old_sidecar).await? {
                rename(&old_sidecar, &self.paths.metadata_path(to, topic)).await?;
            }
        }

        info!(topic = %topic, from, to, "Renamed document");
        Ok(())
    }

    /// Moves the whole topic directory into the trash and returns its new location.
    pub async fn move_to_trash(&self, topic: &TopicId) -> AppResult<PathBuf> {
        let source = self.paths.topic_dir(topic);
        if !dir_exists(&source).await? {
            return Err(AppError::not_found(format!("Topic {topic} does not exist")));
        }

        let trash = self.paths.trash_dir(&self.trash_name);
        ensure_dir(&trash).await?;

        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let mut target = trash.join(format!("{topic}-{stamp}"));
        let mut suffix = 1;
        while dir_exists(&target).await? {
            target = trash.join(format!("{topic}-{stamp}-{suffix}"));
            suffix += 1;
        }

        rename(&source, &target).await?;
        info!(topic = %topic, trash = %target.display(), "Moved topic to trash");
        Ok(target)
    }
}

async fn rename(from: &Path, to: &Path) -> AppResult<()> {
    fs::rename(from, to).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::not_found(format!("Not found: {}", from.display()))
        } else {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to rename {} -> {}", from.display(), to.display()),
                e,
            )
        }
    })
}
