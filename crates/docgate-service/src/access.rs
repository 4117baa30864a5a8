//! Permission enforcement shared by the topic-facing services.

use tracing::warn;

use docgate_core::error::AppError;
use docgate_core::result::AppResult;
use docgate_core::traits::PermissionChecker;
use docgate_core::types::TopicId;

use crate::context::RequestContext;

/// Fails with `Authorization` unless the caller is associated with the topic.
pub async fn require_associated(
    checker: &dyn PermissionChecker,
    ctx: &RequestContext,
    topic: &TopicId,
) -> AppResult<()> {
    if checker.is_associated_to(&ctx.token, topic).await? {
        Ok(())
    } else {
        warn!(user = %ctx.user_id, topic = %topic, "Not associated with topic");
        Err(AppError::authorization(format!(
            "User is not associated with topic {topic}"
        )))
    }
}

/// Fails with `Authorization` unless the caller may edit the topic.
pub async fn require_edit(
    checker: &dyn PermissionChecker,
    ctx: &RequestContext,
    topic: &TopicId,
) -> AppResult<()> {
    if checker.is_allowed_to_edit(&ctx.token, topic).await? {
        Ok(())
    } else {
        warn!(user = %ctx.user_id, topic = %topic, "Edit not allowed");
        Err(AppError::authorization(format!(
            "User may not edit topic {topic}"
        )))
    }
}
