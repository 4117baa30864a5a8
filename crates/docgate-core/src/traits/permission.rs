//! Contract of the external permission service.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::TopicId;

/// Answers whether the bearer of a token may work with a topic.
#[async_trait]
pub trait PermissionChecker: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the token's user may edit the topic's document.
    async fn is_allowed_to_edit(&self, token: &str, topic: &TopicId) -> AppResult<bool>;

    /// Whether the token's user is associated with (may view) the topic.
    async fn is_associated_to(&self, token: &str, topic: &TopicId) -> AppResult<bool>;
}
