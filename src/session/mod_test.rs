use super::*;

fn credential(token: &str) -> Credential {
    Credential { token: token.to_owned(), user: SessionUser::new("Ana Silva", "ana@uni.pt") }
}

// =============================================================================
// MemorySessionStore
// =============================================================================

#[test]
fn memory_store_starts_logged_out() {
    let store = MemorySessionStore::new();
    assert!(store.load().unwrap().is_none());
    assert!(store.token().unwrap().is_none());
}

#[test]
fn memory_store_save_overwrites_previous_credential() {
    let store = MemorySessionStore::new();
    store.save(&credential("first")).unwrap();
    store.save(&credential("second")).unwrap();
    assert_eq!(store.token().unwrap().as_deref(), Some("second"));
}

#[test]
fn memory_store_clear_forgets_both_keys() {
    let store = MemorySessionStore::with_credential(credential("abc"));
    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
    store.clear().unwrap();
}

#[test]
fn update_user_keeps_token() {
    let store = MemorySessionStore::with_credential(credential("abc"));
    store.update_user(&SessionUser::new("Ana S.", "ana.s@uni.pt")).unwrap();
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.token, "abc");
    assert_eq!(loaded.user.name, "Ana S.");
}

#[test]
fn user_without_token_is_not_a_credential() {
    let store = MemorySessionStore::new();
    store.update_user(&SessionUser::new("Ana", "ana@uni.pt")).unwrap();
    assert!(store.load().unwrap().is_none());
}

#[test]
fn require_credential_fails_when_logged_out() {
    let store = MemorySessionStore::new();
    let err = require_credential(&store).unwrap_err();
    assert!(matches!(err, SessionError::NotAuthenticated));
}

// =============================================================================
// StoredSession / SessionUser
// =============================================================================

#[test]
fn empty_token_is_treated_as_logged_out() {
    let stored = StoredSession { token: Some(String::new()), user: None };
    assert!(stored.credential().is_none());
}

#[test]
fn missing_user_defaults_to_blank_snapshot() {
    let stored = StoredSession { token: Some("t".into()), user: None };
    let cred = stored.credential().unwrap();
    assert_eq!(cred.user, SessionUser::default());
}

#[test]
fn session_user_keeps_unknown_fields_and_reads_mongo_id() {
    let user: SessionUser = serde_json::from_value(serde_json::json!({
        "_id": "65f0c0ffee",
        "name": "Ana",
        "email": "ana@uni.pt",
        "memberSince": "2024"
    }))
    .unwrap();
    assert_eq!(user.id().as_deref(), Some("65f0c0ffee"));
    assert_eq!(user.extra.get("memberSince").and_then(Value::as_str), Some("2024"));
}

#[test]
fn session_user_numeric_id() {
    let user: SessionUser = serde_json::from_value(serde_json::json!({ "id": 42, "name": "Rui" })).unwrap();
    assert_eq!(user.id().as_deref(), Some("42"));
    assert_eq!(user.email, "");
}

#[test]
fn session_user_treats_null_name_and_email_as_empty() {
    let user: SessionUser = serde_json::from_str(r#"{"name":null,"email":null,"role":"student"}"#).unwrap();
    assert_eq!(user.name, "");
    assert_eq!(user.email, "");
    assert_eq!(user.extra["role"], "student");
}
