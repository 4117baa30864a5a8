//! Document tracker: reacts to the document server's status notifications.
//!
//! The document server posts to the callback URL whenever an editing
//! session changes state. Save notifications persist the edited document,
//! optionally cutting a new version first; finished-edit notifications for
//! users that already left the session trigger a force-save.

use std::sync::Arc;

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use docgate_core::error::AppError;
use docgate_core::result::AppResult;
use docgate_core::traits::{CommandRequest, ConversionOutcome, ConversionRequest, DocumentService};
use docgate_core::types::{TopicId, base_name, extension};
use docgate_docservice::generate_revision_id;
use docgate_storage::{ArtifactKind, TopicLocks, TopicStore, VersionStore};

/// Session status reported by the document server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    /// No document with the key could be found.
    NotFound,
    /// The document is being edited.
    Editing,
    /// Editing finished; the document must be saved as a new version.
    MustSave,
    /// Saving failed on the server; the last known state must be saved.
    Corrupted,
    /// The document was closed without changes.
    Closed,
    /// Force-save requested; save into the current version.
    MustForceSave,
    /// Force-save failed on the server; save what is available.
    CorruptedForceSave,
    /// Any code this service does not act on.
    Other(i64),
}

impl From<i64> for TrackStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::NotFound,
            1 => Self::Editing,
            2 => Self::MustSave,
            3 => Self::Corrupted,
            4 => Self::Closed,
            6 => Self::MustForceSave,
            7 => Self::CorruptedForceSave,
            other => Self::Other(other),
        }
    }
}

/// A user action reported with an `Editing` notification.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackAction {
    /// `0` = the user finished editing, `1` = connected, `2` = force-save clicked.
    #[serde(rename = "type")]
    pub action_type: i64,
    /// Acting user.
    #[serde(default)]
    pub userid: String,
}

/// Body of a status notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackPayload {
    /// Status code, see [`TrackStatus`].
    #[serde(default)]
    pub status: i64,
    /// Where the saved document can be downloaded.
    #[serde(default)]
    pub url: Option<String>,
    /// Editing-session key.
    #[serde(default)]
    pub key: Option<String>,
    /// Where the change package (`diff.zip`) can be downloaded.
    #[serde(default)]
    pub changesurl: Option<String>,
    /// Change log of the session, either a JSON string or an object.
    #[serde(default)]
    pub changeshistory: Option<Value>,
    /// Change log in the layout newer servers send.
    #[serde(default)]
    pub history: Option<Value>,
    /// User actions.
    #[serde(default)]
    pub actions: Vec<TrackAction>,
    /// Users still connected to the session.
    #[serde(default)]
    pub users: Vec<String>,
}

impl TrackPayload {
    /// Decoded status.
    pub fn track_status(&self) -> TrackStatus {
        TrackStatus::from(self.status)
    }

    /// Whether some user finished editing and is no longer connected.
    pub fn has_departed_editor(&self) -> bool {
        self.actions
            .iter()
            .any(|action| action.action_type == 0 && !self.users.contains(&action.userid))
    }

    /// Change log as stored in `changes.txt`.
    fn changes_text(&self) -> Option<String> {
        match self.changeshistory.as_ref().or(self.history.as_ref())? {
            Value::Null => None,
            Value::String(raw) => Some(raw.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// What handling a notification did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Nothing to do for this status.
    Ignored,
    /// A force-save command was sent (`accepted` = the server took it).
    ForceSave {
        /// Whether the command succeeded.
        accepted: bool,
    },
    /// The document was persisted.
    Saved(SaveReport),
}

/// Result of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// File the content was written to.
    pub file: String,
    /// Version cut for this save, if any.
    pub version: Option<u32>,
    /// The notification repeated the key of the newest version.
    pub duplicate: bool,
    /// The content could not be converted and was stored under a new name.
    pub fallback: bool,
}

/// Handles status notifications for stored documents.
#[derive(Debug, Clone)]
pub struct DocumentTracker {
    /// Current documents.
    topics: Arc<TopicStore>,
    /// Version history.
    versions: Arc<VersionStore>,
    /// Per-topic mutual exclusion.
    locks: Arc<TopicLocks>,
    /// Document server.
    documents: Arc<dyn DocumentService>,
}

impl DocumentTracker {
    /// Creates a new tracker.
    pub fn new(
        topics: Arc<TopicStore>,
        versions: Arc<VersionStore>,
        locks: Arc<TopicLocks>,
        documents: Arc<dyn DocumentService>,
    ) -> Self {
        Self {
            topics,
            versions,
            locks,
            documents,
        }
    }

    /// Dispatches a notification for `file_name` of `topic`.
    pub async fn handle(
        &self,
        topic: &TopicId,
        file_name: &str,
        payload: &TrackPayload,
    ) -> AppResult<TrackOutcome> {
        let status = payload.track_status();
        debug!(topic = %topic, file = file_name, status = payload.status, "Track notification");

        match status {
            TrackStatus::Editing => Ok(self.force_save_if_departed(topic, payload).await),
            TrackStatus::MustSave | TrackStatus::Corrupted => self
                .process_save(topic, file_name, payload, true)
                .await
                .map(TrackOutcome::Saved),
            TrackStatus::MustForceSave | TrackStatus::CorruptedForceSave => self
                .process_save(topic, file_name, payload, false)
                .await
                .map(TrackOutcome::Saved),
            _ => Ok(TrackOutcome::Ignored),
        }
    }

    async fn force_save_if_departed(&self, topic: &TopicId, payload: &TrackPayload) -> TrackOutcome {
        if !payload.has_departed_editor() {
            return TrackOutcome::Ignored;
        }
        let Some(key) = payload.key.clone().filter(|k| !k.is_empty()) else {
            warn!(topic = %topic, "Finished edit without a document key");
            return TrackOutcome::Ignored;
        };

        let command = CommandRequest::ForceSave { key };
        match self.documents.command(&command).await {
            Ok(()) => {
                info!(topic = %topic, key = command.key(), "Force-save requested");
                TrackOutcome::ForceSave { accepted: true }
            }
            Err(e) => {
                warn!(topic = %topic, key = command.key(), error = %e, "Force-save failed");
                TrackOutcome::ForceSave { accepted: false }
            }
        }
    }

    /// Persists the document the notification points at.
    ///
    /// All downloads happen before the topic is locked and touched. With
    /// `new_version` the previous content is archived as a new version of
    /// `file_name` unless the newest version already carries the payload's key.
    /// Content stored under a fallback name never cuts a version of `file_name`.
    pub async fn process_save(
        &self,
        topic: &TopicId,
        file_name: &str,
        payload: &TrackPayload,
        new_version: bool,
    ) -> AppResult<SaveReport> {
        let download_uri = payload
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::validation("Save notification without a document URL"))?;

        let current_ext = extension(file_name);
        let download_ext = extension(download_uri);

        let (fetch_uri, fallback_ext) = if !download_ext.is_empty() && download_ext != current_ext {
            self.convert_for_save(topic, download_uri, &download_ext, &current_ext)
                .await
        } else {
            (download_uri.to_string(), None)
        };

        let content = self.documents.download(&fetch_uri).await?;
        let diff = self.fetch_changes(topic, payload).await;

        let _guard = self.locks.lock(topic).await;

        let target = match &fallback_ext {
            Some(ext) => {
                self.topics
                    .correct_name(topic, &format!("{}{ext}", base_name(file_name)))
                    .await?
            }
            None => file_name.to_string(),
        };

        let mut report = SaveReport {
            file: target.clone(),
            version: None,
            duplicate: false,
            fallback: fallback_ext.is_some(),
        };

        if new_version && report.fallback {
            info!(
                topic = %topic,
                file = file_name,
                stored = %target,
                "Unconverted content stored separately, no version cut"
            );
        } else if new_version {
            self.versions.ensure_history_root(topic, file_name).await?;
            let latest = self.versions.latest_key(topic, file_name).await?;

            if payload.key.is_some() && latest == payload.key {
                info!(topic = %topic, file = file_name, "Duplicate save notification, no new version");
                report.duplicate = true;
            } else {
                report.version = Some(
                    self.cut_version(topic, file_name, payload, diff.as_deref())
                        .await?,
                );
            }
        }

        self.topics.replace_document(topic, &target, &content).await?;

        if fallback_ext.is_some() {
            if let Some(meta) = self.topics.read_metadata(topic, file_name).await? {
                self.topics.write_metadata(topic, &target, &meta).await?;
            }
        }

        info!(
            topic = %topic,
            file = %target,
            version = report.version,
            bytes = content.len(),
            "Document saved"
        );
        Ok(report)
    }

    /// Returns the URI to fetch and, if conversion failed, the extension to store under.
    async fn convert_for_save(
        &self,
        topic: &TopicId,
        download_uri: &str,
        download_ext: &str,
        current_ext: &str,
    ) -> (String, Option<String>) {
        let request = ConversionRequest {
            source_uri: download_uri.to_string(),
            source_ext: download_ext.to_string(),
            target_ext: current_ext.to_string(),
            revision_key: generate_revision_id(download_uri),
            is_async: false,
        };

        match self.documents.convert(&request).await {
            Ok(ConversionOutcome::Completed(uri)) => (uri, None),
            Ok(ConversionOutcome::Pending { percent }) => {
                warn!(topic = %topic, percent, "Conversion unfinished, keeping original format");
                (download_uri.to_string(), Some(download_ext.to_string()))
            }
            Err(e) => {
                warn!(topic = %topic, error = %e, "Conversion failed, keeping original format");
                (download_uri.to_string(), Some(download_ext.to_string()))
            }
        }
    }

    /// Downloads the change package, if any. Failures only lose the diff.
    async fn fetch_changes(&self, topic: &TopicId, payload: &TrackPayload) -> Option<Bytes> {
        let uri = payload.changesurl.as_deref().filter(|u| !u.is_empty())?;
        match self.documents.download(uri).await {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(topic = %topic, error = %e, "Could not fetch change package");
                None
            }
        }
    }

    /// Allocates a version and writes its artifacts. Caller holds the topic lock.
    async fn cut_version(
        &self,
        topic: &TopicId,
        file_name: &str,
        payload: &TrackPayload,
        diff: Option<&[u8]>,
    ) -> AppResult<u32> {
        let version = self.versions.create_version(topic, file_name).await?;
        let key = payload.key.as_deref().unwrap_or_default();
        if key.is_empty() {
            warn!(
                topic = %topic,
                file = file_name,
                version,
                "Save notification without a key, version cannot be matched against duplicates"
            );
        }

        self.versions
            .write_artifact(topic, file_name, version, ArtifactKind::Key, key.as_bytes())
            .await?;

        if let Some(diff) = diff {
            self.versions
                .write_artifact(topic, file_name, version, ArtifactKind::Diff, diff)
                .await?;
        }

        if let Some(changes) = payload.changes_text() {
            self.versions
                .write_artifact(topic, file_name, version, ArtifactKind::Changes, changes.as_bytes())
                .await?;
        }

        match self.topics.read_document(topic, file_name).await {
            Ok(previous) => {
                self.versions
                    .write_artifact(topic, file_name, version, ArtifactKind::Prev, &previous)
                    .await?;
            }
            Err(e) if e.is_not_found() => {
                warn!(topic = %topic, file = file_name, version, "No previous content to archive");
            }
            Err(e) => return Err(e),
        }

        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use docgate_core::error::ErrorKind;
    use docgate_storage::{FileMetadata, HistoryState};
    use serde_json::json;

    use super::*;
    use crate::testing::{MockDocuments, fixture, topic};

    const SAVED: &str = "http://ds/cache/42/output.docx";

    fn tracker(f: &crate::testing::Fixture, docs: Arc<MockDocuments>) -> DocumentTracker {
        DocumentTracker::new(
            Arc::clone(&f.topics),
            Arc::clone(&f.versions),
            Arc::clone(&f.locks),
            docs,
        )
    }

    fn payload(value: serde_json::Value) -> TrackPayload {
        serde_json::from_value(value).unwrap()
    }

    async fn seed(f: &crate::testing::Fixture, id: &str, name: &str, content: &[u8]) {
        let t = topic(id);
        f.topics
            .create_document(&t, name, None, &FileMetadata::new("owner", "Owner"))
            .await
            .unwrap();
        f.topics.replace_document(&t, name, content).await.unwrap();
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TrackStatus::from(1), TrackStatus::Editing);
        assert_eq!(TrackStatus::from(2), TrackStatus::MustSave);
        assert_eq!(TrackStatus::from(7), TrackStatus::CorruptedForceSave);
        assert_eq!(TrackStatus::from(5), TrackStatus::Other(5));
    }

    #[test]
    fn test_changes_text_accepts_string_and_object() {
        let p = payload(json!({"status": 2, "changeshistory": "{\"changes\":[]}"}));
        assert_eq!(p.changes_text().as_deref(), Some("{\"changes\":[]}"));

        let p = payload(json!({"status": 2, "history": {"changes": []}}));
        assert_eq!(p.changes_text().as_deref(), Some("{\"changes\":[]}"));

        assert_eq!(payload(json!({"status": 2})).changes_text(), None);
    }

    #[tokio::test]
    async fn test_must_save_cuts_first_version() {
        let f = fixture();
        seed(&f, "42", "42.docx", b"original").await;
        let docs = Arc::new(
            MockDocuments::default()
                .with_file(SAVED, b"edited")
                .with_file("http://ds/changes.zip", b"zip"),
        );
        let t = topic("42");

        let outcome = tracker(&f, docs)
            .handle(
                &t,
                "42.docx",
                &payload(json!({
                    "status": 2,
                    "url": SAVED,
                    "key": "k1",
                    "changesurl": "http://ds/changes.zip",
                    "changeshistory": "{\"changes\":[]}"
                })),
            )
            .await
            .unwrap();

        let TrackOutcome::Saved(report) = outcome else {
            panic!("expected a save");
        };
        assert_eq!(report.version, Some(1));
        assert_eq!(f.versions.count_versions(&t, "42.docx").await.unwrap(), 1);
        assert_eq!(f.versions.read_key(&t, "42.docx", 1).await.unwrap(), "k1");
        assert_eq!(
            f.versions
                .read_artifact(&t, "42.docx", 1, ArtifactKind::Prev)
                .await
                .unwrap()
                .as_ref(),
            b"original"
        );
        assert_eq!(
            f.versions
                .read_artifact(&t, "42.docx", 1, ArtifactKind::Diff)
                .await
                .unwrap()
                .as_ref(),
            b"zip"
        );
        assert_eq!(
            f.topics.read_document(&t, "42.docx").await.unwrap().as_ref(),
            b"edited"
        );
    }

    #[tokio::test]
    async fn test_must_save_creates_missing_history_root() {
        let f = fixture();
        let t = topic("42");
        f.topics.replace_document(&t, "42.docx", b"original").await.unwrap();
        assert_eq!(
            f.versions.history_state(&t, "42.docx").await.unwrap(),
            HistoryState::NoHistory
        );
        let docs = Arc::new(MockDocuments::default().with_file(SAVED, b"edited"));

        tracker(&f, docs)
            .handle(&t, "42.docx", &payload(json!({"status": 2, "url": SAVED, "key": "k1"})))
            .await
            .unwrap();

        let root = f.versions.paths().history_root_path("42.docx", &t);
        assert!(root.is_dir());
        assert_eq!(
            f.versions.history_state(&t, "42.docx").await.unwrap(),
            HistoryState::Versions { root, count: 1 }
        );
        assert_eq!(f.versions.read_key(&t, "42.docx", 1).await.unwrap(), "k1");
        assert_eq!(
            f.versions
                .read_artifact(&t, "42.docx", 1, ArtifactKind::Prev)
                .await
                .unwrap()
                .as_ref(),
            b"original"
        );
        assert_eq!(
            f.topics.read_document(&t, "42.docx").await.unwrap().as_ref(),
            b"edited"
        );
    }

    #[tokio::test]
    async fn test_must_save_without_key_still_versions() {
        let f = fixture();
        seed(&f, "42", "42.docx", b"original").await;
        let docs = Arc::new(MockDocuments::default().with_file(SAVED, b"edited"));
        let tracker = tracker(&f, docs);
        let t = topic("42");
        let body = payload(json!({"status": 2, "url": SAVED}));

        tracker.handle(&t, "42.docx", &body).await.unwrap();
        let second = tracker.handle(&t, "42.docx", &body).await.unwrap();

        assert!(matches!(
            second,
            TrackOutcome::Saved(SaveReport { duplicate: false, version: Some(2), .. })
        ));
        assert_eq!(f.versions.read_key(&t, "42.docx", 1).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_duplicate_must_save_cuts_one_version() {
        let f = fixture();
        seed(&f, "42", "42.docx", b"original").await;
        let docs = Arc::new(MockDocuments::default().with_file(SAVED, b"edited"));
        let tracker = tracker(&f, docs);
        let t = topic("42");
        let body = payload(json!({"status": 2, "url": SAVED, "key": "same"}));

        tracker.handle(&t, "42.docx", &body).await.unwrap();
        let second = tracker.handle(&t, "42.docx", &body).await.unwrap();

        assert!(matches!(second, TrackOutcome::Saved(SaveReport { duplicate: true, .. })));
        assert_eq!(f.versions.count_versions(&t, "42.docx").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_force_save_does_not_cut_a_version() {
        let f = fixture();
        seed(&f, "7", "7.docx", b"original").await;
        let docs = Arc::new(MockDocuments::default().with_file(SAVED, b"forced"));
        let t = topic("7");

        tracker(&f, docs)
            .handle(&t, "7.docx", &payload(json!({"status": 6, "url": SAVED, "key": "k"})))
            .await
            .unwrap();

        assert_eq!(f.versions.count_versions(&t, "7.docx").await.unwrap(), 0);
        assert_eq!(
            f.topics.read_document(&t, "7.docx").await.unwrap().as_ref(),
            b"forced"
        );
    }

    #[tokio::test]
    async fn test_conversion_timeout_keeps_content_under_foreign_extension() {
        let f = fixture();
        seed(&f, "42", "42.docx", b"original").await;
        let odt = "http://ds/cache/42/output.odt";
        let docs = Arc::new(
            MockDocuments::default()
                .with_file(odt, b"odt-content")
                .with_file("http://ds/changes.zip", b"zip")
                .with_conversion(Err(ErrorKind::ConversionTimeout)),
        );
        let t = topic("42");

        let outcome = tracker(&f, Arc::clone(&docs))
            .handle(
                &t,
                "42.docx",
                &payload(json!({
                    "status": 2,
                    "url": odt,
                    "key": "k1",
                    "changesurl": "http://ds/changes.zip"
                })),
            )
            .await
            .unwrap();

        let TrackOutcome::Saved(report) = outcome else {
            panic!("expected a save");
        };
        assert!(report.fallback);
        assert_eq!(report.file, "42.odt");
        assert_eq!(
            f.topics.read_document(&t, "42.odt").await.unwrap().as_ref(),
            b"odt-content"
        );
        assert_eq!(
            f.topics.read_document(&t, "42.docx").await.unwrap().as_ref(),
            b"original"
        );
        assert_eq!(report.version, None);
        assert_eq!(f.versions.count_versions(&t, "42.docx").await.unwrap(), 0);
        assert_eq!(f.versions.count_versions(&t, "42.odt").await.unwrap(), 0);

        let requests = docs.conversions.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source_ext, ".odt");
        assert_eq!(requests[0].target_ext, ".docx");
        assert_eq!(requests[0].revision_key, generate_revision_id(odt));
        assert!(!requests[0].is_async);
    }

    #[tokio::test]
    async fn test_fallback_name_does_not_collide() {
        let f = fixture();
        seed(&f, "42", "42.docx", b"original").await;
        f.topics
            .replace_document(&topic("42"), "42.odt", b"older")
            .await
            .unwrap();
        let odt = "http://ds/out.odt";
        let docs = Arc::new(MockDocuments::default().with_file(odt, b"new"));

        let outcome = tracker(&f, docs)
            .handle(&topic("42"), "42.docx", &payload(json!({"status": 6, "url": odt})))
            .await
            .unwrap();

        assert!(matches!(outcome, TrackOutcome::Saved(SaveReport { ref file, .. }) if file == "42 (1).odt"));
    }

    #[tokio::test]
    async fn test_completed_conversion_fetches_converted_document() {
        let f = fixture();
        seed(&f, "42", "42.docx", b"original").await;
        let docs = Arc::new(
            MockDocuments::default()
                .with_file("http://ds/converted.docx", b"converted")
                .with_conversion(Ok(ConversionOutcome::Completed(
                    "http://ds/converted.docx".to_string(),
                ))),
        );
        let t = topic("42");

        tracker(&f, docs)
            .handle(&t, "42.docx", &payload(json!({"status": 2, "url": "http://ds/o.odt", "key": "k"})))
            .await
            .unwrap();

        assert_eq!(
            f.topics.read_document(&t, "42.docx").await.unwrap().as_ref(),
            b"converted"
        );
        assert!(!f.topics.exists(&t, "42.odt").await.unwrap());
    }

    #[tokio::test]
    async fn test_editing_with_departed_user_force_saves_once() {
        let f = fixture();
        let docs = Arc::new(MockDocuments::default());
        let t = topic("42");

        let outcome = tracker(&f, Arc::clone(&docs))
            .handle(
                &t,
                "42.docx",
                &payload(json!({
                    "status": 1,
                    "key": "session-key",
                    "actions": [{"type": 0, "userid": "u1"}],
                    "users": ["u2"]
                })),
            )
            .await
            .unwrap();

        assert_eq!(outcome, TrackOutcome::ForceSave { accepted: true });
        let commands = docs.commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].key(), "session-key");
    }

    #[tokio::test]
    async fn test_editing_with_present_user_does_nothing() {
        let f = fixture();
        let docs = Arc::new(MockDocuments::default());

        let outcome = tracker(&f, Arc::clone(&docs))
            .handle(
                &topic("42"),
                "42.docx",
                &payload(json!({
                    "status": 1,
                    "key": "k",
                    "actions": [{"type": 1, "userid": "u1"}, {"type": 0, "userid": "u2"}],
                    "users": ["u1", "u2"]
                })),
            )
            .await
            .unwrap();

        assert_eq!(outcome, TrackOutcome::Ignored);
        assert_eq!(docs.command_count(), 0);
    }

    #[tokio::test]
    async fn test_save_without_url_fails_without_touching_disk() {
        let f = fixture();
        seed(&f, "42", "42.docx", b"original").await;
        let t = topic("42");

        let err = tracker(&f, Arc::new(MockDocuments::default()))
            .handle(&t, "42.docx", &payload(json!({"status": 2, "key": "k"})))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(f.versions.count_versions(&t, "42.docx").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_download_leaves_history_untouched() {
        let f = fixture();
        seed(&f, "42", "42.docx", b"original").await;
        let t = topic("42");

        let result = tracker(&f, Arc::new(MockDocuments::default()))
            .handle(&t, "42.docx", &payload(json!({"status": 2, "url": SAVED, "key": "k"})))
            .await;

        assert!(result.is_err());
        assert_eq!(f.versions.count_versions(&t, "42.docx").await.unwrap(), 0);
        assert_eq!(
            f.topics.read_document(&t, "42.docx").await.unwrap().as_ref(),
            b"original"
        );
    }

    #[tokio::test]
    async fn test_concurrent_saves_get_distinct_versions() {
        let f = fixture();
        seed(&f, "42", "42.docx", b"original").await;
        let docs = Arc::new(
            MockDocuments::default()
                .with_file(SAVED, b"edited")
                .with_download_delay(Duration::from_millis(10)),
        );
        let tracker = Arc::new(tracker(&f, docs));
        let t = topic("42");

        let mut tasks = Vec::new();
        for key in ["a", "b", "c", "d"] {
            let tracker = Arc::clone(&tracker);
            let t = t.clone();
            tasks.push(tokio::spawn(async move {
                tracker
                    .handle(&t, "42.docx", &payload(json!({"status": 2, "url": SAVED, "key": key})))
                    .await
                    .unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(f.versions.count_versions(&t, "42.docx").await.unwrap(), 4);
        let mut keys = Vec::new();
        for version in 1..=4 {
            keys.push(f.versions.read_key(&t, "42.docx", version).await.unwrap());
        }
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
    }
}
