use super::*;
use crate::error::ErrorCode;
use crate::test_helpers::{MockServer, logged_in, logged_out};

#[tokio::test]
async fn list_normalizes_row_shapes() {
    let body = r#"[
        {"exercise":{"_id":"e1","title":"Joins"}},
        {"item":{"_id":"e2","title":"Graphs"}},
        {"_id":"e3","title":"Heaps"},
        "e4"
    ]"#;
    let server = MockServer::start(&[("GET", "/exercises/saved", 200, body)]).await;
    let gateway = server.gateway(logged_in("t"));

    let saved = list(&gateway).await.unwrap();
    let keys: Vec<_> = saved.iter().map(SavedItem::exercise_key).collect();
    assert_eq!(keys, [Some("e1"), Some("e2"), Some("e3"), Some("e4")]);
    assert_eq!(saved[1].exercise.title, "Graphs");
}

#[tokio::test]
async fn list_of_non_array_is_empty() {
    let server = MockServer::start(&[("GET", "/exercises/saved", 200, r#"{"items":[]}"#)]).await;
    let gateway = server.gateway(logged_in("t"));
    assert!(list(&gateway).await.unwrap().is_empty());
}

#[tokio::test]
async fn is_saved_and_toggle_send_token() {
    let server = MockServer::start(&[
        ("GET", "/exercises/e1/is-saved", 200, r#"{"saved":false}"#),
        ("POST", "/exercises/e1/save-toggle", 200, r#"{"saved":true,"savesCount":"n/a"}"#),
    ])
    .await;
    let gateway = server.gateway(logged_in("t"));

    assert_eq!(is_saved(&gateway, "e1").await.unwrap(), SaveState::default());
    let state = toggle(&gateway, "e1").await.unwrap();
    assert!(state.saved);
    assert_eq!(state.saves_count, None);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.header("authorization") == Some("Bearer t")));
    assert_eq!(requests[1].method, "POST");
}

#[tokio::test]
async fn saved_operations_need_login() {
    let server = MockServer::start(&[]).await;
    let gateway = server.gateway(logged_out());
    assert_eq!(list(&gateway).await.unwrap_err().error_code(), "E_NOT_AUTHENTICATED");
    assert_eq!(toggle(&gateway, "e1").await.unwrap_err().error_code(), "E_NOT_AUTHENTICATED");
    assert!(server.requests().is_empty());
}
