//! Version store: the append-only history of a topic's document.
//!
//! Versions are numbered 1, 2, 3, … without gaps. The current count is
//! never stored; it is recovered by probing version directories until the
//! first missing one. Callers must hold the topic's lock from
//! [`crate::TopicLocks`] around [`VersionStore::create_version`] and the
//! artifact writes that follow it.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, info, warn};

use docgate_core::error::{AppError, ErrorKind};
use docgate_core::result::AppResult;
use docgate_core::types::TopicId;

use crate::paths::{ArtifactKind, HistoryRoot, PathResolver, dir_exists, ensure_dir, write_atomic};

/// History state of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryState {
    /// No history directory: the document has never been saved by the editor.
    NoHistory,
    /// History directory exists but holds no completed version yet.
    Empty {
        /// History root directory.
        root: PathBuf,
    },
    /// History directory with `count` contiguous versions.
    Versions {
        /// History root directory.
        root: PathBuf,
        /// Number of versions (≥ 1).
        count: u32,
    },
}

impl HistoryState {
    /// Number of completed versions.
    pub fn count(&self) -> u32 {
        match self {
            Self::NoHistory | Self::Empty { .. } => 0,
            Self::Versions { count, .. } => *count,
        }
    }
}

/// A detected inconsistency in a document's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// A completed version has no `key.txt`.
    MissingKey {
        /// Affected version.
        version: u32,
    },
}

/// Reads and writes version directories and their artifacts.
#[derive(Debug, Clone)]
pub struct VersionStore {
    /// Path resolver shared with the topic store.
    paths: PathResolver,
}

impl VersionStore {
    /// Creates a version store over the given resolver.
    pub fn new(paths: PathResolver) -> Self {
        Self { paths }
    }

    /// The underlying path resolver.
    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Counts contiguous versions by probing `1`, `2`, … until one is missing.
    pub async fn count_versions(&self, topic: &TopicId, name: &str) -> AppResult<u32> {
        match self.paths.history_root(name, topic).await? {
            HistoryRoot::NoHistory => Ok(0),
            HistoryRoot::Root(root) => count_in(&root).await,
        }
    }

    /// Resolves the three-way history state of a document.
    pub async fn history_state(&self, topic: &TopicId, name: &str) -> AppResult<HistoryState> {
        match self.paths.history_root(name, topic).await? {
            HistoryRoot::NoHistory => Ok(HistoryState::NoHistory),
            HistoryRoot::Root(root) => {
                let count = count_in(&root).await?;
                if count == 0 {
                    Ok(HistoryState::Empty { root })
                } else {
                    Ok(HistoryState::Versions { root, count })
                }
            }
        }
    }

    /// Creates the history root if absent and returns its path.
    pub async fn ensure_history_root(&self, topic: &TopicId, name: &str) -> AppResult<PathBuf> {
        let root = self.paths.history_root_path(name, topic);
        if !dir_exists(&root).await? {
            ensure_dir(&root).await?;
            info!(topic = %topic, file = name, "Created history root");
        }
        Ok(root)
    }

    /// Allocates the next version directory and returns its number.
    ///
    /// The directory is created with a non-recursive `create_dir`, so an
    /// allocation that races with another writer fails instead of silently
    /// sharing a directory.
    pub async fn create_version(&self, topic: &TopicId, name: &str) -> AppResult<u32> {
        let root = self.ensure_history_root(topic, name).await?;
        let version = count_in(&root).await? + 1;
        let dir = root.join(version.to_string());

        fs::create_dir(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create version directory: {}", dir.display()),
                e,
            )
        })?;

        info!(topic = %topic, file = name, version, "Created version");
        Ok(version)
    }

    /// Writes one artifact of a version, replacing any previous content.
    pub async fn write_artifact(
        &self,
        topic: &TopicId,
        name: &str,
        version: u32,
        kind: ArtifactKind,
        data: &[u8],
    ) -> AppResult<()> {
        let dir = self.paths.version_dir(name, topic, version);
        if !dir_exists(&dir).await? {
            return Err(AppError::not_found(format!(
                "Version {version} of {name} in topic {topic} does not exist"
            )));
        }

        let path = self.paths.artifact_path(name, topic, version, kind);
        write_atomic(&path, data).await?;

        debug!(
            topic = %topic,
            version,
            artifact = kind.as_str(),
            bytes = data.len(),
            "Wrote version artifact"
        );
        Ok(())
    }

    /// Reads one artifact of a version; a missing artifact is `NotFound`.
    pub async fn read_artifact(
        &self,
        topic: &TopicId,
        name: &str,
        version: u32,
        kind: ArtifactKind,
    ) -> AppResult<Bytes> {
        let path = self.paths.artifact_path(name, topic, version, kind);
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::not_found(
                format!("No {} recorded for version {version} of {name}", kind.as_str()),
            )),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read {} of version {version}", kind.as_str()),
                e,
            )),
        }
    }

    /// Reads an artifact, mapping absence to `None`.
    pub async fn read_optional_artifact(
        &self,
        topic: &TopicId,
        name: &str,
        version: u32,
        kind: ArtifactKind,
    ) -> AppResult<Option<Bytes>> {
        match self.read_artifact(topic, name, version, kind).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Reads the mandatory key of a completed version.
    ///
    /// A completed version without a key is an [`ErrorKind::Integrity`] error.
    pub async fn read_key(&self, topic: &TopicId, name: &str, version: u32) -> AppResult<String> {
        match self
            .read_optional_artifact(topic, name, version, ArtifactKind::Key)
            .await?
        {
            Some(data) => Ok(String::from_utf8_lossy(&data).into_owned()),
            None => Err(AppError::integrity(format!(
                "Version {version} of {name} in topic {topic} has no key"
            ))),
        }
    }

    /// Key of the newest version, if there is one and it carries a key.
    pub async fn latest_key(&self, topic: &TopicId, name: &str) -> AppResult<Option<String>> {
        let count = self.count_versions(topic, name).await?;
        if count == 0 {
            return Ok(None);
        }
        let key = self
            .read_optional_artifact(topic, name, count, ArtifactKind::Key)
            .await?;
        Ok(key.map(|k| String::from_utf8_lossy(&k).into_owned()))
    }

    /// Lists completed versions whose mandatory artifacts are missing.
    pub async fn verify(&self, topic: &TopicId, name: &str) -> AppResult<Vec<Inconsistency>> {
        let count = self.count_versions(topic, name).await?;
        let mut problems = Vec::new();
        for version in 1..=count {
            if self
                .read_optional_artifact(topic, name, version, ArtifactKind::Key)
                .await?
                .is_none()
            {
                warn!(topic = %topic, file = name, version, "Version without key");
                problems.push(Inconsistency::MissingKey { version });
            }
        }
        Ok(problems)
    }
}

async fn count_in(root: &Path) -> AppResult<u32> {
    let mut count = 0u32;
    while dir_exists(&root.join((count + 1).to_string())).await? {
        count += 1;
    }
    Ok(count)
}
