//! Request gateway: the single path every API call takes.
//!
//! DESIGN
//! ======
//! A call is split into two steps. `prepare` is pure apart from reading
//! the session token: it resolves the URL, computes headers and picks the
//! wire body. `request` sends the prepared call and normalizes the
//! response. The header rules:
//!
//! - `Authorization: Bearer <token>` only when `auth` is set and a token
//!   is stored.
//! - Caller headers are merged over the computed defaults.
//! - JSON/text bodies get `Content-Type: application/json` unless the
//!   caller already set a content type.
//! - Multipart bodies never carry a caller content type; reqwest writes
//!   its own with the boundary.
//!
//! ERROR HANDLING
//! ==============
//! Two failure kinds reach callers: transport (connection, TLS, body read)
//! and application (non-2xx status). Application failures carry the
//! server's `message` when it sent one. There is no retry, timeout or
//! backoff here; callers decide.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod multipart;
pub mod options;

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::session::{SessionError, SessionStore};

pub use multipart::{MultipartField, MultipartPayload, MultipartValue};
pub use options::{HttpMethod, RequestBody, RequestOptions};

/// Message used when a failed response carries no usable `message`.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

const JSON_CONTENT_TYPE: &str = "application/json";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a complete response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Application { status: u16, message: String, body: Value },

    /// A caller-supplied header name or value is not valid HTTP.
    #[error("invalid header `{name}`")]
    InvalidHeader { name: String },

    #[error(transparent)]
    Session(#[from] SessionError),

    /// A successful response did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// HTTP status of an application failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl ErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Application { .. } => "E_APPLICATION",
            Self::InvalidHeader { .. } => "E_INVALID_HEADER",
            Self::Session(e) => e.error_code(),
            Self::Decode(_) => "E_DECODE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Application { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Body as it goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedBody {
    Empty,
    Text(String),
    Multipart(MultipartPayload),
}

/// Fully resolved call, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: PreparedBody,
}

// =============================================================================
// GATEWAY
// =============================================================================

/// HTTP gateway bound to one base URL and one session store.
///
/// Cheap to clone; clones share the connection pool and the store.
#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl Gateway {
    /// Build a gateway with a fresh HTTP client.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, base_url, session))
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: &str, session: Arc<dyn SessionStore>) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_owned(), session }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    /// Absolute URL for an API path such as `/exercises/42`.
    #[must_use]
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}", self.base_url)
        }
    }

    /// Resolve URL, headers and wire body without sending anything.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` for malformed caller headers, or `Session`
    /// if the token cannot be read.
    pub fn prepare(&self, endpoint: &str, options: RequestOptions) -> Result<PreparedRequest, GatewayError> {
        let token = if options.auth { self.session.token()? } else { None };
        let headers = build_headers(token.as_deref(), &options.headers, options.body.as_ref())?;
        let body = match options.body {
            None => PreparedBody::Empty,
            Some(RequestBody::Json(value)) => PreparedBody::Text(serde_json::to_string(&value)?),
            Some(RequestBody::Text(raw)) => PreparedBody::Text(raw),
            Some(RequestBody::Multipart(payload)) => PreparedBody::Multipart(payload),
        };
        Ok(PreparedRequest { method: options.method, url: self.url(endpoint), headers, body })
    }

    /// Send one request and return the decoded body.
    ///
    /// # Errors
    ///
    /// Returns `Transport` on network failure and `Application` for a
    /// non-2xx status; see [`GatewayError`].
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, GatewayError> {
        let body_kind = options.body.as_ref().map_or("none", RequestBody::kind);
        let prepared = self.prepare(endpoint, options)?;
        debug!(
            method = %prepared.method,
            endpoint,
            authenticated = prepared.headers.contains_key(AUTHORIZATION),
            body = body_kind,
            "gateway request"
        );

        let builder = self
            .http
            .request(prepared.method.into(), &prepared.url)
            .headers(prepared.headers);
        let builder = match prepared.body {
            PreparedBody::Empty => builder,
            PreparedBody::Text(raw) => builder.body(raw),
            PreparedBody::Multipart(payload) => builder.multipart(payload.into_form()?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(endpoint, status = status.as_u16(), bytes = text.len(), "gateway response");

        finish(status, &text)
    }

    /// [`Gateway::request`], then decode the body into `T`.
    ///
    /// # Errors
    ///
    /// As `request`, plus `Decode` when the body does not fit `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        let value = self.request(endpoint, options).await?;
        Ok(serde_json::from_value(value)?)
    }
}

// =============================================================================
// HEADERS
// =============================================================================

fn build_headers(
    token: Option<&str>,
    custom: &[(String, String)],
    body: Option<&RequestBody>,
) -> Result<HeaderMap, GatewayError> {
    let mut headers = HeaderMap::new();

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| GatewayError::InvalidHeader { name: AUTHORIZATION.to_string() })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    for (name, value) in custom {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| GatewayError::InvalidHeader { name: name.clone() })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| GatewayError::InvalidHeader { name: name.clone() })?;
        headers.insert(header_name, header_value);
    }

    match body {
        Some(RequestBody::Multipart(_)) => {
            headers.remove(CONTENT_TYPE);
        }
        Some(_) if !headers.contains_key(CONTENT_TYPE) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        _ => {}
    }

    Ok(headers)
}

// =============================================================================
// RESPONSES
// =============================================================================

/// JSON when the text parses, the raw text otherwise, `Null` when empty.
#[must_use]
pub fn decode_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

/// Message for a failed response: the body's `message` string, or the default.
#[must_use]
pub fn failure_message(data: &Value) -> String {
    data.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
        .to_owned()
}

fn finish(status: StatusCode, text: &str) -> Result<Value, GatewayError> {
    let data = decode_body(text);
    if status.is_success() {
        return Ok(data);
    }
    let message = failure_message(&data);
    warn!(status = status.as_u16(), %message, "request rejected by server");
    Err(GatewayError::Application { status: status.as_u16(), message, body: data })
}
