//! Per-call request options.

#[cfg(test)]
#[path = "options_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::multipart::MultipartPayload;

// =============================================================================
// METHOD
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported method '{other}' (expected GET, POST, PUT or DELETE)")),
        }
    }
}

// =============================================================================
// BODY
// =============================================================================

/// Outgoing request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured value, serialized to JSON on send.
    Json(Value),
    /// Pre-serialized payload, sent verbatim.
    Text(String),
    /// Form fields and files; the transport owns the content type.
    Multipart(MultipartPayload),
}

impl RequestBody {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::Multipart(_) => "multipart",
        }
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for a single gateway call. Defaults to an unauthenticated GET
/// with no body and no extra headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<RequestBody>,
    /// Caller overrides, applied over the computed defaults.
    pub headers: Vec<(String, String)>,
    /// Attach the stored bearer token when one exists.
    pub auth: bool,
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post() -> Self {
        Self { method: HttpMethod::Post, ..Self::default() }
    }

    #[must_use]
    pub fn put() -> Self {
        Self { method: HttpMethod::Put, ..Self::default() }
    }

    #[must_use]
    pub fn delete() -> Self {
        Self { method: HttpMethod::Delete, ..Self::default() }
    }

    #[must_use]
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    #[must_use]
    pub fn text(mut self, raw: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(raw.into()));
        self
    }

    #[must_use]
    pub fn multipart(mut self, payload: MultipartPayload) -> Self {
        self.body = Some(RequestBody::Multipart(payload));
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn authenticated(mut self) -> Self {
        self.auth = true;
        self
    }
}
