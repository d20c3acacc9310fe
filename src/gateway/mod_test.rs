use super::*;
use crate::test_helpers::{MockServer, logged_in, logged_out};

fn offline(store: Arc<dyn SessionStore>) -> Gateway {
    Gateway::new("http://localhost:3000/api/", store).unwrap()
}

// =============================================================================
// prepare: headers and body rules
// =============================================================================

#[test]
fn get_without_body_sets_no_content_type() {
    let prepared = offline(logged_out()).prepare("/exercises", RequestOptions::get()).unwrap();
    assert!(!prepared.headers.contains_key(CONTENT_TYPE));
    assert_eq!(prepared.body, PreparedBody::Empty);
    assert_eq!(prepared.url, "http://localhost:3000/api/exercises");
}

#[test]
fn json_body_is_serialized_with_json_content_type() {
    let options = RequestOptions::post().json(serde_json::json!({ "email": "a@b.pt", "password": "pw" }));
    let prepared = offline(logged_out()).prepare("/auth/login", options).unwrap();
    assert_eq!(prepared.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    let PreparedBody::Text(raw) = prepared.body else {
        panic!("expected text body");
    };
    let round: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(round["email"], "a@b.pt");
}

#[test]
fn string_body_is_sent_verbatim() {
    let options = RequestOptions::post().text("{\"already\":\"serialized\"}");
    let prepared = offline(logged_out()).prepare("/x", options).unwrap();
    assert_eq!(prepared.body, PreparedBody::Text("{\"already\":\"serialized\"}".into()));
    assert_eq!(prepared.headers.get(CONTENT_TYPE).unwrap(), "application/json");
}

#[test]
fn explicit_content_type_wins_over_json_default() {
    let options = RequestOptions::post().text("a=1").header("content-type", "application/x-www-form-urlencoded");
    let prepared = offline(logged_out()).prepare("/x", options).unwrap();
    assert_eq!(prepared.headers.get_all(CONTENT_TYPE).iter().count(), 1);
    assert_eq!(prepared.headers.get(CONTENT_TYPE).unwrap(), "application/x-www-form-urlencoded");
}

#[test]
fn multipart_never_carries_content_type_even_when_overridden() {
    let payload = MultipartPayload::new().text("text", "hello");
    let options = RequestOptions::post().multipart(payload.clone()).header("Content-Type", "application/json");
    let prepared = offline(logged_out()).prepare("/x", options).unwrap();
    assert!(!prepared.headers.contains_key(CONTENT_TYPE));
    assert_eq!(prepared.body, PreparedBody::Multipart(payload));
}

#[test]
fn token_attached_only_when_auth_requested() {
    let gateway = offline(logged_in("tok-123"));

    let anonymous = gateway.prepare("/exercises", RequestOptions::get()).unwrap();
    assert!(!anonymous.headers.contains_key(AUTHORIZATION));

    let authed = gateway.prepare("/exercises/mine", RequestOptions::get().authenticated()).unwrap();
    assert_eq!(authed.headers.get(AUTHORIZATION).unwrap(), "Bearer tok-123");
    assert!(authed.headers.get(AUTHORIZATION).unwrap().is_sensitive());
}

#[test]
fn auth_without_stored_token_sends_no_header() {
    let prepared = offline(logged_out())
        .prepare("/exercises/mine", RequestOptions::get().authenticated())
        .unwrap();
    assert!(!prepared.headers.contains_key(AUTHORIZATION));
}

#[test]
fn caller_headers_override_computed_defaults() {
    let options = RequestOptions::get().authenticated().header("Authorization", "Bearer override");
    let prepared = offline(logged_in("stored")).prepare("/x", options).unwrap();
    assert_eq!(prepared.headers.get(AUTHORIZATION).unwrap(), "Bearer override");
}

#[test]
fn invalid_header_name_is_rejected() {
    let options = RequestOptions::get().header("bad header", "x");
    let err = offline(logged_out()).prepare("/x", options).unwrap_err();
    assert!(matches!(err, GatewayError::InvalidHeader { name } if name == "bad header"));
}

#[test]
fn endpoint_without_leading_slash_is_joined() {
    let gateway = offline(logged_out());
    assert_eq!(gateway.url("users/me"), "http://localhost:3000/api/users/me");
    assert_eq!(gateway.base_url(), "http://localhost:3000/api");
}

// =============================================================================
// finish: response normalization
// =============================================================================

#[test]
fn failure_uses_server_message() {
    let err = finish(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid credentials"}"#).unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.status(), Some(401));
}

#[test]
fn failure_with_unparseable_body_uses_default_message() {
    let err = finish(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").unwrap_err();
    assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
    assert!(err.retryable());
}

#[test]
fn failure_with_non_string_or_empty_message_uses_default() {
    assert_eq!(failure_message(&serde_json::json!({ "message": 42 })), DEFAULT_ERROR_MESSAGE);
    assert_eq!(failure_message(&serde_json::json!({ "message": "" })), DEFAULT_ERROR_MESSAGE);
    assert_eq!(failure_message(&Value::Null), DEFAULT_ERROR_MESSAGE);
}

#[test]
fn empty_success_body_is_null() {
    assert_eq!(finish(StatusCode::OK, "").unwrap(), Value::Null);
}

#[test]
fn plain_text_success_body_is_returned_verbatim() {
    assert_eq!(finish(StatusCode::OK, "plain text").unwrap(), Value::String("plain text".into()));
}

#[test]
fn json_success_body_is_parsed() {
    let value = finish(StatusCode::CREATED, r#"{"saved":true}"#).unwrap();
    assert_eq!(value["saved"], true);
}

#[test]
fn error_codes_are_stable() {
    let app = finish(StatusCode::BAD_REQUEST, "").unwrap_err();
    assert_eq!(app.error_code(), "E_APPLICATION");
    assert!(!app.retryable());
    let session = GatewayError::from(SessionError::NotAuthenticated);
    assert_eq!(session.error_code(), "E_NOT_AUTHENTICATED");
}

// =============================================================================
// request: over the wire
// =============================================================================

#[tokio::test]
async fn request_sends_bearer_and_json_over_the_wire() {
    let server = MockServer::start(&[("POST", "/users/me", 200, r#"{"ok":true}"#)]).await;
    let gateway = server.gateway(logged_in("wire-token"));

    let options = RequestOptions::post().json(serde_json::json!({ "name": "Ana" })).authenticated();
    let value = gateway.request("/users/me", options).await.unwrap();
    assert_eq!(value["ok"], true);

    let seen = server.last();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.header("authorization"), Some("Bearer wire-token"));
    assert_eq!(seen.header("content-type"), Some("application/json"));
    assert_eq!(seen.body_json()["name"], "Ana");
}

#[tokio::test]
async fn request_multipart_gets_transport_boundary_only() {
    let server = MockServer::start(&[("POST", "/exercises/7/comments", 201, r#"{"id":"c1"}"#)]).await;
    let gateway = server.gateway(logged_in("t"));

    let payload = MultipartPayload::new()
        .text("text", "nice one")
        .file("files", "notes.pdf", b"%PDF-1.4".to_vec());
    let options = RequestOptions::post()
        .multipart(payload)
        .header("Content-Type", "application/json")
        .authenticated();
    gateway.request("/exercises/7/comments", options).await.unwrap();

    let seen = server.last();
    assert_eq!(seen.header_count("content-type"), 1);
    assert!(seen.header("content-type").unwrap().starts_with("multipart/form-data; boundary="));
    let body = seen.body_text();
    assert!(body.contains("name=\"text\""));
    assert!(body.contains("nice one"));
    assert!(body.contains("filename=\"notes.pdf\""));
}

#[tokio::test]
async fn request_surfaces_application_failure() {
    let server = MockServer::start(&[("POST", "/auth/login", 401, r#"{"message":"Invalid credentials"}"#)]).await;
    let gateway = server.gateway(logged_out());

    let err = gateway
        .request("/auth/login", RequestOptions::post().json(serde_json::json!({})))
        .await
        .unwrap_err();
    assert!(matches!(&err, GatewayError::Application { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn request_get_sends_no_content_type_or_token() {
    let server = MockServer::start(&[("GET", "/exercises", 200, "[]")]).await;
    let gateway = server.gateway(logged_in("secret"));

    let value = gateway.request("/exercises", RequestOptions::get()).await.unwrap();
    assert_eq!(value, serde_json::json!([]));

    let seen = server.last();
    assert!(seen.header("content-type").is_none());
    assert!(seen.header("authorization").is_none());
}

#[tokio::test]
async fn request_empty_body_yields_null() {
    let server = MockServer::start(&[("DELETE", "/exercises/9", 204, "")]).await;
    let gateway = server.gateway(logged_in("t"));
    let value = gateway.request("/exercises/9", RequestOptions::delete().authenticated()).await.unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn request_as_reports_shape_mismatch() {
    #[derive(Debug, serde::Deserialize)]
    struct Saved {
        #[allow(dead_code)]
        saved: bool,
    }

    let server = MockServer::start(&[("GET", "/odd", 200, "plain text")]).await;
    let gateway = server.gateway(logged_out());
    let err = gateway.request_as::<Saved>("/odd", RequestOptions::get()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = Gateway::new(&format!("http://{addr}/api"), logged_out()).unwrap();
    let err = gateway.request("/exercises", RequestOptions::get()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
    assert_eq!(err.error_code(), "E_TRANSPORT");
}
