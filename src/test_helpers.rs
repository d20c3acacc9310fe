//! In-process HTTP double for gateway and service tests.
//!
//! Every request is recorded; responses come from a canned table keyed on
//! method and path (relative to `/api`). Unknown routes answer 404.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::gateway::Gateway;
use crate::session::{Credential, MemorySessionStore, SessionStore, SessionUser};

const API_PREFIX: &str = "/api";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn header_count(&self, name: &str) -> usize {
        self.headers.iter().filter(|(key, _)| key.eq_ignore_ascii_case(name)).count()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("recorded body should be JSON")
    }
}

#[derive(Debug, Clone)]
struct Canned {
    method: &'static str,
    path: String,
    status: u16,
    body: String,
}

#[derive(Clone, Default)]
struct Shared {
    routes: Arc<Vec<Canned>>,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockServer {
    base_url: String,
    shared: Shared,
}

impl MockServer {
    /// Start a server answering `(method, path, status, body)` routes.
    pub async fn start(routes: &[(&'static str, &str, u16, &str)]) -> Self {
        let canned = routes
            .iter()
            .map(|(method, path, status, body)| Canned {
                method: *method,
                path: (*path).to_owned(),
                status: *status,
                body: (*body).to_owned(),
            })
            .collect();
        let shared = Shared { routes: Arc::new(canned), recorded: Arc::default() };
        let app = Router::new().fallback(handle).with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        Self { base_url: format!("http://{addr}{API_PREFIX}"), shared }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.recorded.lock().expect("recorded lock").clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("no request was recorded")
    }

    pub fn gateway(&self, store: Arc<dyn SessionStore>) -> Gateway {
        Gateway::new(&self.base_url, store).expect("gateway build")
    }
}

async fn handle(State(shared): State<Shared>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let full_path = parts.uri.path();
    let path = full_path.strip_prefix(API_PREFIX).unwrap_or(full_path).to_owned();
    let headers = parts
        .headers
        .iter()
        .map(|(key, value)| (key.as_str().to_owned(), value.to_str().unwrap_or_default().to_owned()))
        .collect();

    shared.recorded.lock().expect("recorded lock").push(Recorded {
        method: parts.method.as_str().to_owned(),
        path: path.clone(),
        headers,
        body: bytes.to_vec(),
    });

    match shared.routes.iter().find(|c| c.method == parts.method.as_str() && c.path == path) {
        Some(canned) => {
            let status = StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, canned.body.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, r#"{"message":"Route not found"}"#.to_owned()).into_response(),
    }
}

/// Store holding a credential for "Ana Silva" with the given token.
pub fn logged_in(token: &str) -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::with_credential(Credential {
        token: token.to_owned(),
        user: SessionUser::new("Ana Silva", "ana@uni.pt"),
    }))
}

pub fn logged_out() -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::new())
}
