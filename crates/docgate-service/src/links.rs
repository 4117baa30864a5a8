//! Public URLs of stored documents and of the editor callback.

use docgate_core::types::TopicId;

/// Builds the URLs the editor and document server use to reach us.
#[derive(Debug, Clone)]
pub struct StorageLinks {
    /// Externally reachable base URL, without trailing slash.
    server_url: String,
}

impl StorageLinks {
    /// Creates a link builder for `server_url`.
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url = server_url.into();
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// URL of a topic's document.
    pub fn file_uri(&self, topic: &TopicId, name: &str) -> String {
        format!(
            "{}/storage/{}/{}",
            self.server_url,
            urlencoding::encode(topic.as_str()),
            urlencoding::encode(name)
        )
    }

    /// URL of a version directory of a document.
    pub fn version_uri(&self, topic: &TopicId, name: &str, version: u32) -> String {
        format!("{}-history/{version}", self.file_uri(topic, name))
    }

    /// Callback URL the document server posts status notifications to.
    pub fn callback_url(&self, topic: &TopicId, name: &str) -> String {
        format!(
            "{}/track?topic={}&filename={}",
            self.server_url,
            urlencoding::encode(topic.as_str()),
            urlencoding::encode(name)
        )
    }
}
