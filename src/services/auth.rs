//! Account access: registration, login, logout.
//!
//! A successful login or registration replaces whatever credential was
//! stored; logout forgets it. No network call is made on logout.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use serde_json::json;
use tracing::info;

use super::{ServiceError, protected};
use crate::gateway::{Gateway, RequestOptions};
use crate::session::Credential;
use crate::types::AuthResponse;

const REGISTER_NO_TOKEN: &str = "Registration succeeded but no token was returned.";
const LOGIN_NO_TOKEN: &str = "Login succeeded but no token was returned.";

/// Sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
}

impl Registration {
    /// Check the form the way the sign-up page did, first failure wins.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` with the first problem found.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let fields = [&self.name, &self.email, &self.password, &self.confirm_password];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ServiceError::invalid("All fields are required"));
        }
        if self.password != self.confirm_password {
            return Err(ServiceError::invalid("Passwords do not match"));
        }
        if !self.accepted_terms {
            return Err(ServiceError::invalid("You must accept the terms and conditions"));
        }
        Ok(())
    }
}

/// Create an account and store the returned credential.
///
/// # Errors
///
/// Returns `Invalid` for a bad form, `MissingToken` if the server omits the
/// token, or the gateway/session error.
pub async fn register(gateway: &Gateway, form: &Registration) -> Result<Credential, ServiceError> {
    form.validate()?;
    let body = json!({ "name": form.name.trim(), "email": form.email.trim(), "password": form.password });
    let response: AuthResponse = gateway
        .request_as("/auth/register", RequestOptions::post().json(body))
        .await?;
    store(gateway, response, REGISTER_NO_TOKEN)
}

/// Exchange email and password for a credential and store it.
///
/// # Errors
///
/// Returns `Invalid` for blank input, `MissingToken` if the server omits the
/// token, or the gateway/session error.
pub async fn login(gateway: &Gateway, email: &str, password: &str) -> Result<Credential, ServiceError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ServiceError::invalid("Email and password are required"));
    }
    let body = json!({ "email": email.trim(), "password": password });
    let response: AuthResponse = gateway
        .request_as("/auth/login", RequestOptions::post().json(body))
        .await?;
    store(gateway, response, LOGIN_NO_TOKEN)
}

/// Forget the stored credential.
///
/// # Errors
///
/// Returns the session error if the store cannot be cleared.
pub fn logout(gateway: &Gateway) -> Result<(), ServiceError> {
    gateway.session().clear()?;
    info!("logged out");
    Ok(())
}

/// The stored credential, or `NotAuthenticated`.
///
/// # Errors
///
/// Returns `NotAuthenticated` when logged out.
pub fn current_user(gateway: &Gateway) -> Result<Credential, ServiceError> {
    protected(gateway)
}

fn store(gateway: &Gateway, response: AuthResponse, missing: &'static str) -> Result<Credential, ServiceError> {
    let token = response
        .token
        .filter(|t| !t.is_empty())
        .ok_or(ServiceError::MissingToken(missing))?;
    let credential = Credential { token, user: response.user.unwrap_or_default() };
    gateway.session().save(&credential)?;
    info!(email = %credential.user.email, "session stored");
    Ok(credential)
}
