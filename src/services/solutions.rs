//! Solutions: per exercise and the user's own.

#[cfg(test)]
#[path = "solutions_test.rs"]
mod tests;

use tracing::info;

use super::{ServiceError, Submission, list_or_empty, path_id, protected, record_or_default};
use crate::gateway::{Gateway, RequestOptions};
use crate::types::Solution;

/// Solutions submitted for one exercise.
///
/// # Errors
///
/// Returns `Invalid` for a malformed id, or the gateway/decode error.
pub async fn list(gateway: &Gateway, exercise_id: &str) -> Result<Vec<Solution>, ServiceError> {
    let path = format!("/exercises/{}/solutions", path_id(exercise_id)?);
    let value = gateway.request(&path, RequestOptions::get()).await?;
    list_or_empty(value)
}

/// Submit a solution: notes in `text`, files in `files`.
///
/// # Errors
///
/// Returns `NotAuthenticated`, `Invalid`, `Attachment`, or the gateway error.
pub async fn create(gateway: &Gateway, exercise_id: &str, submission: Submission) -> Result<Solution, ServiceError> {
    protected(gateway)?;
    let path = format!("/exercises/{}/solutions", path_id(exercise_id)?);
    submission.validate("Solution")?;
    let payload = submission.into_payload().await?;
    let value = gateway
        .request(&path, RequestOptions::post().multipart(payload).authenticated())
        .await?;
    info!(exercise_id, "solution submitted");
    record_or_default(value)
}

/// Solutions the logged-in user submitted, across all exercises.
///
/// # Errors
///
/// Returns `NotAuthenticated` when logged out, or the gateway/decode error.
pub async fn mine(gateway: &Gateway) -> Result<Vec<Solution>, ServiceError> {
    protected(gateway)?;
    let value = gateway
        .request("/solutions/mine", RequestOptions::get().authenticated())
        .await?;
    list_or_empty(value)
}
