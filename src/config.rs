//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::session::FileSessionStore;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const API_URL_VAR: &str = "COLLAB_API_URL";
pub const SESSION_FILE_VAR: &str = "COLLAB_SESSION_FILE";

const FALLBACK_SESSION_FILE: &str = ".collab-exercises/session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API URL '{0}' (expected http:// or https://)")]
    InvalidApiUrl(String),
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidApiUrl(_) => "E_CONFIG",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint is appended to, without trailing `/`.
    pub api_url: String,
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `COLLAB_API_URL`: default `http://localhost:3000/api`
    /// - `COLLAB_SESSION_FILE`: default `<data_dir>/collab-exercises/session.json`
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(env_non_empty(API_URL_VAR), env_non_empty(SESSION_FILE_VAR).map(PathBuf::from))
    }

    /// Apply defaults to explicitly supplied values.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is not an http(s) URL.
    pub fn resolve(api_url: Option<String>, session_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(api_url.as_deref().unwrap_or(DEFAULT_API_URL))?;
        let session_file = session_file
            .or_else(FileSessionStore::default_path)
            .unwrap_or_else(|| PathBuf::from(FALLBACK_SESSION_FILE));
        Ok(Self { api_url, session_file })
    }
}

fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_host {
        return Err(ConfigError::InvalidApiUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
