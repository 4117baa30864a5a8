//! Route handlers organized by domain.

pub mod convert;
pub mod health;
pub mod topic;
pub mod track;

use docgate_core::types::TopicId;

use crate::error::ApiError;

/// Parses a topic id taken from the path or query.
pub(crate) fn parse_topic(raw: &str) -> Result<TopicId, ApiError> {
    Ok(TopicId::parse(raw)?)
}
