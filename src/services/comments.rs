//! Comments on an exercise.

#[cfg(test)]
#[path = "comments_test.rs"]
mod tests;

use tracing::info;

use super::{ServiceError, Submission, list_or_empty, path_id, protected, record_or_default};
use crate::gateway::{Gateway, RequestOptions};
use crate::types::Comment;

/// Comments of one exercise, newest first as the server orders them.
///
/// # Errors
///
/// Returns `Invalid` for a malformed id, or the gateway/decode error.
pub async fn list(gateway: &Gateway, exercise_id: &str) -> Result<Vec<Comment>, ServiceError> {
    let path = format!("/exercises/{}/comments", path_id(exercise_id)?);
    let value = gateway.request(&path, RequestOptions::get()).await?;
    list_or_empty(value)
}

/// Post a comment with optional attachments.
///
/// # Errors
///
/// Returns `NotAuthenticated`, `Invalid`, `Attachment`, or the gateway error.
pub async fn create(gateway: &Gateway, exercise_id: &str, submission: Submission) -> Result<Comment, ServiceError> {
    protected(gateway)?;
    let path = format!("/exercises/{}/comments", path_id(exercise_id)?);
    submission.validate("Comment")?;
    let payload = submission.into_payload().await?;
    let value = gateway
        .request(&path, RequestOptions::post().multipart(payload).authenticated())
        .await?;
    info!(exercise_id, "comment posted");
    record_or_default(value)
}
