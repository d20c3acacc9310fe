//! Exercises: browse, inspect, create, delete.

#[cfg(test)]
#[path = "exercises_test.rs"]
mod tests;

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{ServiceError, attach_files, comments, list_or_empty, path_id, protected, record_or_default, saved, solutions};
use crate::display::ExerciseFilter;
use crate::gateway::{Gateway, MultipartPayload, RequestOptions};
use crate::types::{Comment, Exercise, SaveState, Solution};

/// Create-exercise form. Attachments are paths read at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewExercise {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub difficulty: String,
    pub files: Vec<PathBuf>,
}

impl NewExercise {
    /// Check every required field and report all problems together.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` listing each missing field.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let problems: Vec<String> = [
            (&self.title, "Title is required."),
            (&self.description, "Description is required."),
            (&self.subject, "Subject is required."),
            (&self.difficulty, "Difficulty is required."),
        ]
        .iter()
        .filter(|(value, _)| value.trim().is_empty())
        .map(|(_, message)| (*message).to_owned())
        .collect();

        if problems.is_empty() { Ok(()) } else { Err(ServiceError::Invalid(problems)) }
    }

    async fn into_payload(self) -> Result<MultipartPayload, ServiceError> {
        let mut payload = MultipartPayload::new()
            .text("title", self.title.trim())
            .text("description", self.description.trim())
            .text("subject", self.subject.trim())
            .text("difficulty", self.difficulty.trim());
        attach_files(&mut payload, &self.files).await?;
        Ok(payload)
    }
}

/// Everything the exercise page shows, fetched concurrently.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseDetail {
    pub exercise: Exercise,
    pub comments: Vec<Comment>,
    pub solutions: Vec<Solution>,
    /// `None` when logged out or the saved state could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<SaveState>,
}

/// All exercises, narrowed by the dashboard filter.
///
/// # Errors
///
/// Returns the gateway error or a decode error.
pub async fn list(gateway: &Gateway, filter: &ExerciseFilter) -> Result<Vec<Exercise>, ServiceError> {
    let value = gateway.request("/exercises", RequestOptions::get()).await?;
    Ok(filter.apply(list_or_empty(value)?))
}

/// One exercise.
///
/// # Errors
///
/// Returns `Invalid` for a malformed id, or the gateway/decode error.
pub async fn get(gateway: &Gateway, id: &str) -> Result<Exercise, ServiceError> {
    let path = format!("/exercises/{}", path_id(id)?);
    let value = gateway.request(&path, RequestOptions::get()).await?;
    record_or_default(value)
}

/// Exercises authored by the logged-in user.
///
/// # Errors
///
/// Returns `NotAuthenticated` when logged out, or the gateway/decode error.
pub async fn mine(gateway: &Gateway) -> Result<Vec<Exercise>, ServiceError> {
    protected(gateway)?;
    let value = gateway
        .request("/exercises/mine", RequestOptions::get().authenticated())
        .await?;
    list_or_empty(value)
}

/// Publish an exercise with its attachments.
///
/// # Errors
///
/// Returns `NotAuthenticated`, `Invalid`, `Attachment`, or the gateway error.
pub async fn create(gateway: &Gateway, form: NewExercise) -> Result<Exercise, ServiceError> {
    protected(gateway)?;
    form.validate()?;
    let payload = form.into_payload().await?;
    let value = gateway
        .request("/exercises", RequestOptions::post().multipart(payload).authenticated())
        .await?;
    let created: Exercise = record_or_default(value)?;
    info!(id = created.key().unwrap_or("?"), "exercise created");
    Ok(created)
}

/// Delete one of the user's exercises. Returns whatever the server sent.
///
/// # Errors
///
/// Returns `NotAuthenticated`, `Invalid`, or the gateway error.
pub async fn delete(gateway: &Gateway, id: &str) -> Result<Value, ServiceError> {
    protected(gateway)?;
    let path = format!("/exercises/{}", path_id(id)?);
    let value = gateway.request(&path, RequestOptions::delete().authenticated()).await?;
    info!(id, "exercise deleted");
    Ok(value)
}

/// Exercise plus its comments, solutions and saved state.
///
/// Only the exercise itself is required; the other sections degrade to
/// empty (or unknown saved state) with a warning, as the page did.
///
/// # Errors
///
/// Returns the error of the exercise fetch.
pub async fn detail(gateway: &Gateway, id: &str) -> Result<ExerciseDetail, ServiceError> {
    let logged_in = gateway.session().token()?.is_some();
    let saved_state = async {
        if logged_in { Some(saved::is_saved(gateway, id).await) } else { None }
    };

    let (exercise, comment_list, solution_list, saved_result) = tokio::join!(
        get(gateway, id),
        comments::list(gateway, id),
        solutions::list(gateway, id),
        saved_state,
    );

    let exercise = exercise?;
    let comments = comment_list.unwrap_or_else(|e| {
        warn!(error = %e, "comments unavailable");
        Vec::new()
    });
    let solutions = solution_list.unwrap_or_else(|e| {
        warn!(error = %e, "solutions unavailable");
        Vec::new()
    });
    let saved = saved_result.and_then(|result| {
        result
            .inspect_err(|e| warn!(error = %e, "saved state unavailable"))
            .ok()
    });

    Ok(ExerciseDetail { exercise, comments, solutions, saved })
}
