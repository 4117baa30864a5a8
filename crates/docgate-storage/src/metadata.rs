//! Metadata sidecar stored next to a document's history (`created,ownerId,ownerName`).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use docgate_core::error::AppError;
use docgate_core::result::AppResult;

/// Timestamp format used in the sidecar.
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Creation record of a topic's document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// When the document was created.
    pub created: DateTime<Utc>,
    /// Id of the creating user.
    pub owner_id: String,
    /// Display name of the creating user.
    pub owner_name: String,
}

impl FileMetadata {
    /// Creates a record stamped with the current time.
    pub fn new(owner_id: impl Into<String>, owner_name: impl Into<String>) -> Self {
        Self {
            created: Utc::now(),
            owner_id: owner_id.into(),
            owner_name: owner_name.into(),
        }
    }

    /// Creation time formatted the way the editor expects it.
    pub fn created_display(&self) -> String {
        self.created.format(CREATED_FORMAT).to_string()
    }

    /// Encodes the record as `created,ownerId,ownerName`.
    ///
    /// Commas in the owner id are replaced; the owner name is the last field
    /// and may contain commas.
    pub fn encode(&self) -> String {
        format!(
            "{},{},{}",
            self.created_display(),
            self.owner_id.replace(',', "_"),
            self.owner_name
        )
    }

    /// Parses a sidecar record.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let mut parts = raw.trim_end_matches(['\r', '\n']).splitn(3, ',');
        let (Some(created), Some(owner_id), Some(owner_name)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::validation(format!(
                "Malformed metadata record: {raw}"
            )));
        };

        let created = NaiveDateTime::parse_from_str(created.trim(), CREATED_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| AppError::validation(format!("Invalid creation time '{created}': {e}")))?;

        Ok(Self {
            created,
            owner_id: owner_id.to_string(),
            owner_name: owner_name.to_string(),
        })
    }
}
