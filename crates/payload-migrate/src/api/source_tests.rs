//! Tests for the source collection client.

use super::*;

fn test_client(base_url: &str) -> SourceClient {
    SourceClient {
        base_url: base_url.to_string(),
        client: create_http_client(),
        cookie: None,
    }
}

#[test]
fn test_collection_url() {
    let client = test_client("http://localhost:3000/api");
    assert_eq!(
        client.collection_url("donors"),
        "http://localhost:3000/api/donors"
    );
}

#[test]
fn test_collection_url_trailing_slash() {
    let client = test_client("http://localhost:3000/api/");
    assert_eq!(
        client.collection_url("donors"),
        "http://localhost:3000/api/donors"
    );
}

#[test]
fn test_collection_url_leading_slash() {
    let client = test_client("http://localhost:3000/api");
    assert_eq!(
        client.collection_url("/partners"),
        "http://localhost:3000/api/partners"
    );
}

#[test]
fn test_page_envelope_deserialization() {
    let json = r#"{"docs":[{"name":"Acme"}],"page":2,"totalPages":5,"totalDocs":42}"#;
    let envelope: PageEnvelope = serde_json::from_str(json).unwrap();
    assert_eq!(envelope.docs.len(), 1);
    assert_eq!(envelope.page, 2);
    assert_eq!(envelope.total_pages, 5);
}

#[test]
fn test_page_envelope_missing_docs_rejected() {
    let json = r#"{"page":1,"totalPages":1}"#;
    assert!(serde_json::from_str::<PageEnvelope>(json).is_err());
}

#[test]
fn test_page_envelope_empty_page() {
    let json = r#"{"docs":[],"page":1,"totalPages":1}"#;
    let envelope: PageEnvelope = serde_json::from_str(json).unwrap();
    assert!(envelope.docs.is_empty());
}
