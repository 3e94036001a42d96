//! Tests for the sink client.

use super::*;

fn test_client(base_url: &str) -> SinkClient {
    SinkClient {
        base_url: base_url.to_string(),
        client: create_http_client(),
        cookie: None,
    }
}

#[test]
fn test_url_for_collection() {
    let client = test_client("http://localhost:3001/api");
    assert_eq!(client.url_for("donors"), "http://localhost:3001/api/donors");
}

#[test]
fn test_url_for_trailing_slash() {
    let client = test_client("http://localhost:3001/api/");
    assert_eq!(client.url_for("media"), "http://localhost:3001/api/media");
}

#[test]
fn test_duplicate_filename_nested_data() {
    let body = serde_json::json!({
        "errors": [{
            "name": "ValidationError",
            "message": "The following field is invalid: filename",
            "data": [{"field": "filename", "message": "Value must be unique"}]
        }]
    });
    assert!(is_duplicate_filename(&body));
}

#[test]
fn test_duplicate_filename_flat_error() {
    let body = serde_json::json!({
        "errors": [{"field": "filename", "message": "must be unique"}]
    });
    assert!(is_duplicate_filename(&body));
}

#[test]
fn test_duplicate_filename_other_field() {
    let body = serde_json::json!({
        "errors": [{
            "data": [{"field": "slug", "message": "Value must be unique"}]
        }]
    });
    assert!(!is_duplicate_filename(&body));
}

#[test]
fn test_duplicate_filename_other_message() {
    let body = serde_json::json!({
        "errors": [{
            "data": [{"field": "filename", "message": "Invalid file type"}]
        }]
    });
    assert!(!is_duplicate_filename(&body));
}

#[test]
fn test_duplicate_filename_no_errors_array() {
    assert!(!is_duplicate_filename(&serde_json::json!({})));
    assert!(!is_duplicate_filename(&serde_json::json!({"errors": "nope"})));
    assert!(!is_duplicate_filename(&serde_json::json!(null)));
}

#[test]
fn test_duplicate_filename_case_insensitive_message() {
    let body = serde_json::json!({
        "errors": [{
            "data": [{"field": "filename", "message": "Value Must Be Unique."}]
        }]
    });
    assert!(is_duplicate_filename(&body));
}
