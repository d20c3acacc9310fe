//! The logged-in user's own account.
//!
//! Updating the profile also rewrites the cached session user so later
//! commands show the new name without a refetch. Deleting the account
//! forgets the credential.

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;

use serde_json::{Value, json};
use tracing::info;

use super::{ServiceError, protected, record_or_default};
use crate::gateway::{Gateway, RequestOptions};
use crate::session::SessionUser;
use crate::types::UserProfile;

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
}

impl ProfileUpdate {
    /// # Errors
    ///
    /// Returns `Invalid` when either field is blank.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(ServiceError::invalid("Name and email are required."));
        }
        Ok(())
    }
}

/// Profile with member-since date and activity counts.
///
/// # Errors
///
/// Returns `NotAuthenticated` when logged out, or the gateway/decode error.
pub async fn me(gateway: &Gateway) -> Result<UserProfile, ServiceError> {
    protected(gateway)?;
    let value = gateway.request("/users/me", RequestOptions::get().authenticated()).await?;
    record_or_default(value)
}

/// Change name and email, then refresh the cached session user.
///
/// # Errors
///
/// Returns `NotAuthenticated`, `Invalid`, or the gateway/session error.
pub async fn update(gateway: &Gateway, changes: &ProfileUpdate) -> Result<SessionUser, ServiceError> {
    protected(gateway)?;
    changes.validate()?;
    let body = json!({ "name": changes.name.trim(), "email": changes.email.trim() });
    let value = gateway
        .request("/users/me", RequestOptions::put().json(body).authenticated())
        .await?;

    let mut user = match value {
        Value::Object(_) => serde_json::from_value(value)?,
        _ => SessionUser::default(),
    };
    if user.name.is_empty() {
        changes.name.trim().clone_into(&mut user.name);
    }
    if user.email.is_empty() {
        changes.email.trim().clone_into(&mut user.email);
    }
    gateway.session().update_user(&user)?;
    info!(email = %user.email, "profile updated");
    Ok(user)
}

/// Delete the account and forget the credential.
///
/// # Errors
///
/// Returns `NotAuthenticated` or the gateway/session error. The credential
/// is kept when the server refuses.
pub async fn delete_account(gateway: &Gateway) -> Result<(), ServiceError> {
    protected(gateway)?;
    gateway
        .request("/users/me", RequestOptions::delete().authenticated())
        .await?;
    gateway.session().clear()?;
    info!("account deleted");
    Ok(())
}
