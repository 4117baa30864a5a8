//! Topic identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// External identifier of a topic (a logical document).
///
/// A topic id doubles as a directory name under the storage root, so it is
/// validated to be a single, non-traversing path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicId(String);

impl TopicId {
    /// Validates and wraps a raw topic id.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Topic id must not be empty"));
        }
        if trimmed == "." || trimmed == ".." || trimmed.starts_with('.') {
            return Err(AppError::validation(format!("Invalid topic id: {raw}")));
        }
        if trimmed
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
        {
            return Err(AppError::validation(format!("Invalid topic id: {raw}")));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the topic's primary document (`<id>.docx`).
    pub fn default_document(&self) -> String {
        format!("{}.docx", self.0)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TopicId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TopicId> for String {
    fn from(value: TopicId) -> Self {
        value.0
    }
}

impl AsRef<str> for TopicId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
