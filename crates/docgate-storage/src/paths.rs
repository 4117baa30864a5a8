//! Path resolver mapping (file, topic, version) to canonical storage paths.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;

use docgate_core::error::{AppError, ErrorKind};
use docgate_core::result::AppResult;
use docgate_core::types::{TopicId, extension, file_name};

/// Suffix appended to a document name to form its history directory.
const HISTORY_SUFFIX: &str = "-history";

/// Whether a document has a history directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryRoot {
    /// The history directory does not exist.
    NoHistory,
    /// The history directory exists at this path.
    Root(PathBuf),
}

/// Artifacts stored inside a version directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Editing-session key of the version (`key.txt`). Mandatory.
    Key,
    /// Document content before the version's edits (`prev<ext>`).
    Prev,
    /// Compressed change package (`diff.zip`). Optional.
    Diff,
    /// JSON change-log (`changes.txt`). Optional.
    Changes,
}

impl ArtifactKind {
    /// File name of the artifact for a document with extension `ext` (with leading dot).
    pub fn file_name(&self, ext: &str) -> String {
        match self {
            Self::Key => "key.txt".to_string(),
            Self::Prev => format!("prev{ext}"),
            Self::Diff => "diff.zip".to_string(),
            Self::Changes => "changes.txt".to_string(),
        }
    }

    /// Short name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Prev => "prev",
            Self::Diff => "diff",
            Self::Changes => "changes",
        }
    }
}

/// Computes storage paths beneath a root directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Storage root holding one directory per topic.
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a topic.
    pub fn topic_dir(&self, topic: &TopicId) -> PathBuf {
        self.root.join(topic.as_str())
    }

    /// Path of a document inside its topic directory, without touching the disk.
    ///
    /// Only the last segment of `name` is used, so a caller-supplied name
    /// can never escape the topic directory.
    pub fn file_path(&self, name: &str, topic: &TopicId) -> PathBuf {
        self.topic_dir(topic).join(file_name(name))
    }

    /// Canonical storage path of a document, creating the topic directory if needed.
    pub async fn storage_path(&self, name: &str, topic: &TopicId) -> AppResult<PathBuf> {
        ensure_dir(&self.topic_dir(topic)).await?;
        Ok(self.file_path(name, topic))
    }

    /// Path of the history root whether or not it exists.
    pub fn history_root_path(&self, name: &str, topic: &TopicId) -> PathBuf {
        self.topic_dir(topic)
            .join(format!("{}{HISTORY_SUFFIX}", file_name(name)))
    }

    /// Resolves the history root, reporting [`HistoryRoot::NoHistory`] when absent.
    pub async fn history_root(&self, name: &str, topic: &TopicId) -> AppResult<HistoryRoot> {
        let path = self.history_root_path(name, topic);
        if dir_exists(&path).await? {
            Ok(HistoryRoot::Root(path))
        } else {
            Ok(HistoryRoot::NoHistory)
        }
    }

    /// Directory of version `version` (1-based).
    pub fn version_dir(&self, name: &str, topic: &TopicId, version: u32) -> PathBuf {
        self.history_root_path(name, topic).join(version.to_string())
    }

    /// Path of one artifact of a version.
    pub fn artifact_path(
        &self,
        name: &str,
        topic: &TopicId,
        version: u32,
        kind: ArtifactKind,
    ) -> PathBuf {
        self.version_dir(name, topic, version)
            .join(kind.file_name(&extension(name)))
    }

    /// Path of the metadata sidecar (`<history root>/<file>.txt`).
    pub fn metadata_path(&self, name: &str, topic: &TopicId) -> PathBuf {
        self.history_root_path(name, topic)
            .join(format!("{}.txt", file_name(name)))
    }

    /// Trash directory for soft-deleted topics.
    pub fn trash_dir(&self, trash_name: &str) -> PathBuf {
        self.root.join(trash_name)
    }
}

/// Creates a directory and its parents; a no-op if it already exists.
pub async fn ensure_dir(path: &Path) -> AppResult<()> {
    fs::create_dir_all(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to create directory: {}", path.display()),
            e,
        )
    })
}

/// Whether `path` exists and is a directory.
pub async fn dir_exists(path: &Path) -> AppResult<bool> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to stat {}", path.display()),
            e,
        )),
    }
}

/// Whether `path` exists and is a regular file.
pub async fn file_exists(path: &Path) -> AppResult<bool> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to stat {}", path.display()),
            e,
        )),
    }
}

/// Writes `data` next to `path` and renames it into place.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> AppResult<()> {
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.{nanos}.tmp", file_name(&path.to_string_lossy())));

    fs::write(&tmp, data).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to write {}", tmp.display()),
            e,
        )
    })?;

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to move {} into place", path.display()),
            e,
        ));
    }
    Ok(())
}
