//! API operations, one function per endpoint the platform exposes.
//!
//! ARCHITECTURE
//! ============
//! Every function takes the `Gateway` explicitly and goes through
//! `Gateway::request`; nothing here talks HTTP directly. Protected
//! operations check for a stored credential before any network call and
//! request with `auth` set, so a logged-out caller fails fast with
//! `NotAuthenticated` instead of a server 401.
//!
//! Form validation mirrors the messages the web forms showed and runs
//! before the request is built.

pub mod auth;
pub mod comments;
pub mod exercises;
pub mod profile;
pub mod saved;
pub mod solutions;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ErrorCode;
use crate::gateway::{Gateway, GatewayError, MultipartPayload};
use crate::session::{self, Credential, SessionError};

/// Multipart field carrying the free text of comments and solutions.
pub const TEXT_FIELD: &str = "text";
/// Multipart field repeated once per attached file.
pub const FILES_FIELD: &str = "files";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Form validation failed; one message per problem.
    #[error("{}", .0.join(" "))]
    Invalid(Vec<String>),

    /// A success response lacked the token a credential needs.
    #[error("{0}")]
    MissingToken(&'static str),

    #[error("could not read attachment {}: {source}", path.display())]
    Attachment { path: PathBuf, source: std::io::Error },

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ServiceError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(vec![message.into()])
    }
}

impl ErrorCode for ServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Gateway(e) => e.error_code(),
            Self::Session(e) => e.error_code(),
            Self::Invalid(_) => "E_INVALID_INPUT",
            Self::MissingToken(_) => "E_MISSING_TOKEN",
            Self::Attachment { .. } => "E_ATTACHMENT",
            Self::Decode(_) => "E_DECODE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Gateway(e) => e.retryable(),
            _ => false,
        }
    }
}

/// Text plus optional attachments, as posted for comments and solutions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    pub files: Vec<PathBuf>,
}

impl Submission {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), files: Vec::new() }
    }

    #[must_use]
    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    /// Reject blank text.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` when the text is empty after trimming.
    pub fn validate(&self, what: &str) -> Result<(), ServiceError> {
        if self.text.trim().is_empty() {
            return Err(ServiceError::invalid(format!("{what} text is required.")));
        }
        Ok(())
    }

    pub(crate) async fn into_payload(self) -> Result<MultipartPayload, ServiceError> {
        let mut payload = MultipartPayload::new().text(TEXT_FIELD, self.text.trim());
        attach_files(&mut payload, &self.files).await?;
        Ok(payload)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Fail with `NotAuthenticated` unless a credential is stored.
pub(crate) fn protected(gateway: &Gateway) -> Result<Credential, ServiceError> {
    Ok(session::require_credential(gateway.session())?)
}

/// Validate an id before it is spliced into a path. Dot segments are
/// rejected since URL normalization would resolve them to another endpoint.
pub(crate) fn path_id(id: &str) -> Result<&str, ServiceError> {
    let id = id.trim();
    if id.is_empty() || matches!(id, "." | "..") || id.contains(['/', '\\', '?', '#', '%']) {
        return Err(ServiceError::invalid(format!("invalid id '{id}'")));
    }
    Ok(id)
}

/// Decode an array body; anything else is an empty list.
pub(crate) fn list_or_empty<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ServiceError> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Ok(Vec::new()),
    }
}

/// Decode an object body leniently; a non-object becomes `T::default()`.
pub(crate) fn record_or_default<T: DeserializeOwned + Default>(value: Value) -> Result<T, ServiceError> {
    match value {
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => Ok(T::default()),
    }
}

pub(crate) async fn attach_files(payload: &mut MultipartPayload, files: &[PathBuf]) -> Result<(), ServiceError> {
    for path in files {
        payload
            .attach_path(FILES_FIELD, path)
            .await
            .map_err(|source| ServiceError::Attachment { path: path.clone(), source })?;
    }
    Ok(())
}
