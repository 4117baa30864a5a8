//! Request DTOs.

use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Body of `POST /topic`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTopicRequest {
    /// Topic id; the CMS sends either a string or a number.
    #[serde(rename = "topicId", default, deserialize_with = "string_or_number")]
    #[validate(length(min = 1, max = 255, message = "No Topic id given"))]
    pub topic_id: String,
}

/// Query of `GET /topic/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorQuery {
    /// `edit` or `view`.
    pub mode: Option<String>,
    /// `desktop`, `mobile` or `embedded`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// UI language.
    pub lang: Option<String>,
}

/// Query naming a document of a topic (`/track`, `/convert`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileQuery {
    /// Topic id.
    pub topic: Option<String>,
    /// Document file name; the topic's default document when absent.
    pub filename: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
