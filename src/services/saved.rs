//! Saved (bookmarked) exercises.

#[cfg(test)]
#[path = "saved_test.rs"]
mod tests;

use serde_json::Value;

use super::{ServiceError, path_id, protected, record_or_default};
use crate::gateway::{Gateway, RequestOptions};
use crate::types::{SaveState, SavedItem};

/// The user's saved rows, each normalized to its exercise.
///
/// # Errors
///
/// Returns `NotAuthenticated` when logged out, or the gateway/decode error.
pub async fn list(gateway: &Gateway) -> Result<Vec<SavedItem>, ServiceError> {
    protected(gateway)?;
    let value = gateway
        .request("/exercises/saved", RequestOptions::get().authenticated())
        .await?;
    let Value::Array(rows) = value else {
        return Ok(Vec::new());
    };
    rows.into_iter()
        .map(|row| SavedItem::from_row(row).map_err(ServiceError::from))
        .collect()
}

/// Whether the user has saved an exercise.
///
/// # Errors
///
/// Returns `NotAuthenticated`, `Invalid`, or the gateway/decode error.
pub async fn is_saved(gateway: &Gateway, exercise_id: &str) -> Result<SaveState, ServiceError> {
    protected(gateway)?;
    let path = format!("/exercises/{}/is-saved", path_id(exercise_id)?);
    let value = gateway.request(&path, RequestOptions::get().authenticated()).await?;
    record_or_default(value)
}

/// Flip the saved flag; the answer carries the new state and count.
///
/// # Errors
///
/// Returns `NotAuthenticated`, `Invalid`, or the gateway/decode error.
pub async fn toggle(gateway: &Gateway, exercise_id: &str) -> Result<SaveState, ServiceError> {
    protected(gateway)?;
    let path = format!("/exercises/{}/save-toggle", path_id(exercise_id)?);
    let value = gateway.request(&path, RequestOptions::post().authenticated()).await?;
    let state: SaveState = record_or_default(value)?;
    tracing::info!(exercise_id, saved = state.saved, "save toggled");
    Ok(state)
}
