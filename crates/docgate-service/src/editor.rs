//! Editor configuration: everything the client needs to open a topic's
//! document in the document server's editor, including its version history.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use docgate_core::config::{DocumentServerConfig, StorageConfig};
use docgate_core::error::{AppError, ErrorKind};
use docgate_core::result::AppResult;
use docgate_core::traits::PermissionChecker;
use docgate_core::types::{DocumentType, TopicId, extension};
use docgate_docservice::{document_key, generate_revision_id};
use docgate_storage::{ArtifactKind, FileMetadata, TopicStore, VersionStore};

use crate::access::require_associated;
use crate::context::RequestContext;
use crate::links::StorageLinks;

/// Client-selected editor options.
#[derive(Debug, Clone, Default)]
pub struct EditorOptions {
    /// `edit` (default) or `view`.
    pub mode: Option<String>,
    /// `desktop` (default), `mobile` or `embedded`.
    pub kind: Option<String>,
    /// UI language, `en` by default.
    pub lang: Option<String>,
}

/// Configuration handed to the editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Editor script URL.
    pub api_url: String,
    /// The document.
    pub file: FileInfo,
    /// Editor session settings.
    pub editor: EditorSettings,
    /// One entry per completed version plus the current one.
    pub history: Vec<HistoryEntry>,
    /// Document and diff URLs per history entry.
    pub set_history_data: HistoryData,
}

/// Document description.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    /// File name.
    pub name: String,
    /// Extension without the leading dot.
    pub ext: String,
    /// Download URL.
    pub uri: String,
    /// Number of the current version (completed versions + 1).
    pub version: u32,
}

/// Editor session settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    /// `desktop`, `mobile` or `embedded`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `text`, `spreadsheet` or `presentation`.
    pub document_type: String,
    /// Editing-session key.
    pub key: String,
    /// Status notification URL.
    pub callback_url: String,
    /// Whether the user may edit.
    pub is_edit: bool,
    /// `edit` or `view`.
    pub mode: String,
    /// UI language.
    pub lang: String,
    /// User id.
    pub userid: String,
    /// Shown first name.
    pub first_name: String,
    /// Shown last name.
    pub last_name: String,
    /// URL of the file chooser, if any.
    pub file_choice_url: String,
    /// Editor plugin configuration.
    pub plugins: Value,
    /// Whether a "back to folder" link is shown.
    pub can_back_to_folder: bool,
    /// Base URL of this service.
    pub get_server_url: String,
    /// The caller's sanitised address.
    pub cur_user_host_address: String,
}

/// One entry of the editor's version history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Session key of the version.
    pub key: String,
    /// Version number.
    pub version: u32,
    /// Creation time as recorded.
    pub created: String,
    /// Author.
    pub user: HistoryUser,
    /// Change records that produced this version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<Value>>,
}

/// Author of a history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryUser {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Document and diff URLs, indexed like `history`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryData {
    /// Document content of each entry.
    pub url: Vec<String>,
    /// Change package leading to each entry; `null` for the first.
    pub url_diff: Vec<Option<String>>,
}

/// Builds editor configurations.
#[derive(Debug, Clone)]
pub struct EditorService {
    /// Current documents.
    topics: Arc<TopicStore>,
    /// Version history.
    versions: Arc<VersionStore>,
    /// Permission service.
    permissions: Arc<dyn PermissionChecker>,
    /// Supported formats.
    storage: StorageConfig,
    /// Editor endpoints and plugins.
    document_server: DocumentServerConfig,
}

impl EditorService {
    /// Creates a new editor service.
    pub fn new(
        topics: Arc<TopicStore>,
        versions: Arc<VersionStore>,
        permissions: Arc<dyn PermissionChecker>,
        storage: StorageConfig,
        document_server: DocumentServerConfig,
    ) -> Self {
        Self {
            topics,
            versions,
            permissions,
            storage,
            document_server,
        }
    }

    /// Builds the editor configuration of a topic's document.
    pub async fn editor_config(
        &self,
        ctx: &RequestContext,
        links: &StorageLinks,
        topic: &TopicId,
        options: &EditorOptions,
    ) -> AppResult<EditorConfig> {
        require_associated(self.permissions.as_ref(), ctx, topic).await?;

        let name = topic.default_document();
        if !self.topics.exists(topic, &name).await? {
            return Err(AppError::not_found(format!("Topic {topic} has no document")));
        }

        let ext = extension(&name);
        let is_edit = self.storage.is_editable(&ext)
            && self.permissions.is_allowed_to_edit(&ctx.token, topic).await?;
        let mode = if is_edit && options.mode.as_deref() != Some("view") {
            "edit"
        } else {
            "view"
        };

        let count = self.versions.history_state(topic, &name).await?.count();
        let uri = links.file_uri(topic, &name);
        let modified = self.topics.modified(topic, &name).await?;
        let key = document_key(topic, &uri, count, modified);

        let history = self.history(topic, &name, count, &key).await?;
        let set_history_data = self.history_data(links, topic, &name, count).await?;

        debug!(topic = %topic, user = %ctx.user_id, versions = count, mode, "Built editor config");

        Ok(EditorConfig {
            api_url: self.document_server.api_url(),
            file: FileInfo {
                name: name.clone(),
                ext: ext.trim_start_matches('.').to_string(),
                uri,
                version: count + 1,
            },
            editor: EditorSettings {
                kind: options.kind.clone().unwrap_or_else(|| "desktop".to_string()),
                document_type: DocumentType::from_name(&name).as_str().to_string(),
                key,
                callback_url: links.callback_url(topic, &name),
                is_edit,
                mode: mode.to_string(),
                lang: options.lang.clone().unwrap_or_else(|| "en".to_string()),
                userid: ctx.user_id.clone(),
                first_name: ctx.display_name.clone(),
                last_name: String::new(),
                file_choice_url: self.document_server.file_choice_url.clone(),
                plugins: self.document_server.plugins.clone(),
                can_back_to_folder: false,
                get_server_url: links.server_url().to_string(),
                cur_user_host_address: ctx.host_address(),
            },
            history,
            set_history_data,
        })
    }

    /// History entries `1..=count + 1`. Entry `i + 1` is attributed to the
    /// first change record of version `i`; entry 1 to the document's creator.
    async fn history(
        &self,
        topic: &TopicId,
        name: &str,
        count: u32,
        current_key: &str,
    ) -> AppResult<Vec<HistoryEntry>> {
        let origin = self.topics.read_metadata(topic, name).await?;
        let mut entries = Vec::with_capacity(count as usize + 1);
        let mut previous_changes: Option<Vec<Value>> = None;

        for version in 1..=count + 1 {
            let key = if version <= count {
                match self.versions.read_key(topic, name, version).await {
                    Ok(key) => key,
                    Err(e) if e.kind == ErrorKind::Integrity => {
                        warn!(topic = %topic, file = name, version, "Version has no key, using a derived one");
                        generate_revision_id(&format!("{topic}{name}{version}"))
                    }
                    Err(e) => return Err(e),
                }
            } else {
                current_key.to_string()
            };

            let (created, user) = attribution(previous_changes.as_deref(), origin.as_ref());
            entries.push(HistoryEntry {
                key,
                version,
                created,
                user,
                changes: previous_changes.take(),
            });

            if version <= count {
                previous_changes = self
                    .versions
                    .read_optional_artifact(topic, name, version, ArtifactKind::Changes)
                    .await?
                    .and_then(|raw| change_records(&raw));
            }
        }

        Ok(entries)
    }

    /// `url[i - 1]` is the `prev` snapshot of version `i`, the last URL the
    /// current document; `url_diff[i]` is the change package of version `i`.
    async fn history_data(
        &self,
        links: &StorageLinks,
        topic: &TopicId,
        name: &str,
        count: u32,
    ) -> AppResult<HistoryData> {
        let ext = extension(name);
        let mut url = Vec::with_capacity(count as usize + 1);
        let mut url_diff = Vec::with_capacity(count as usize + 1);
        url_diff.push(None);

        for version in 1..=count {
            let base = links.version_uri(topic, name, version);
            url.push(format!("{base}/{}", ArtifactKind::Prev.file_name(&ext)));

            let has_diff = self
                .versions
                .read_optional_artifact(topic, name, version, ArtifactKind::Diff)
                .await?
                .is_some();
            url_diff.push(has_diff.then(|| format!("{base}/{}", ArtifactKind::Diff.file_name(&ext))));
        }
        url.push(links.file_uri(topic, name));

        Ok(HistoryData { url, url_diff })
    }
}

/// Parses a `changes.txt` record list (`{"changes": [...]}` or a bare array).
fn change_records(raw: &[u8]) -> Option<Vec<Value>> {
    match serde_json::from_slice::<Value>(raw).ok()? {
        Value::Array(records) => Some(records),
        Value::Object(mut map) => match map.remove("changes") {
            Some(Value::Array(records)) => Some(records),
            _ => None,
        },
        _ => None,
    }
}

/// Creation time and author of a history entry.
fn attribution(changes: Option<&[Value]>, origin: Option<&FileMetadata>) -> (String, HistoryUser) {
    if let Some(record) = changes.and_then(|records| records.first()) {
        let text = |value: Option<&Value>| {
            value
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let user = record.get("user");
        let created = text(record.get("created").or_else(|| record.get("date")));
        let id = text(
            user.and_then(|u| u.get("id"))
                .or_else(|| record.get("userid")),
        );
        let name = text(
            user.and_then(|u| u.get("name"))
                .or_else(|| record.get("username")),
        );
        return (created, HistoryUser { id, name });
    }

    match origin {
        Some(meta) => (
            meta.created_display(),
            HistoryUser {
                id: meta.owner_id.clone(),
                name: meta.owner_name.clone(),
            },
        ),
        None => (String::new(), HistoryUser::default()),
    }
}
