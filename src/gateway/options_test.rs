use super::*;

#[test]
fn default_options_are_anonymous_get() {
    let options = RequestOptions::default();
    assert_eq!(options.method, HttpMethod::Get);
    assert!(options.body.is_none());
    assert!(options.headers.is_empty());
    assert!(!options.auth);
}

#[test]
fn builders_set_method_and_flags() {
    let options = RequestOptions::put().json(serde_json::json!({ "name": "x" })).authenticated();
    assert_eq!(options.method, HttpMethod::Put);
    assert!(options.auth);
    assert_eq!(options.body.as_ref().map(RequestBody::kind), Some("json"));
    assert_eq!(RequestOptions::delete().method(HttpMethod::Post).method, HttpMethod::Post);
}

#[test]
fn later_body_replaces_earlier_one() {
    let options = RequestOptions::post().text("raw").multipart(MultipartPayload::new());
    assert!(options.body.as_ref().is_some_and(RequestBody::is_multipart));
}

#[test]
fn method_parses_case_insensitively() {
    assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
    assert_eq!(" Delete ".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
    assert!("PATCH".parse::<HttpMethod>().is_err());
}

#[test]
fn method_maps_to_reqwest() {
    assert_eq!(reqwest::Method::from(HttpMethod::Put), reqwest::Method::PUT);
    assert_eq!(HttpMethod::Post.to_string(), "POST");
}
