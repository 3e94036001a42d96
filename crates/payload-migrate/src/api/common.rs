//! Shared utilities for the backend API clients.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default HTTP timeout for all backend requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a configured HTTP client with timeouts.
#[must_use]
pub fn create_http_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Validates a backend base URL.
///
/// # Errors
///
/// Returns [`Error::Config`] for non-HTTP schemes or malformed URLs.
pub fn validate_url(url: &str) -> Result<()> {
    let has_valid_scheme = url.starts_with("http://") || url.starts_with("https://");
    if !has_valid_scheme {
        return Err(Error::Config(format!(
            "invalid URL scheme in '{url}'. Allowed: http, https"
        )));
    }
    if url.len() < 10 || !url.contains("://") {
        return Err(Error::Config(format!("invalid URL format: {url}")));
    }
    Ok(())
}

/// Extracts a record identifier from a JSON value.
///
/// Backends mint identifiers as strings; numeric ids from older installs
/// are stringified. Anything else is treated as absent.
#[must_use]
pub fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts `filename` from a file payload.
#[must_use]
pub fn payload_filename(payload: &Value) -> Option<&str> {
    payload.get("filename").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_valid() {
        assert!(validate_url("http://localhost:3000/api").is_ok());
        assert!(validate_url("https://cms.example.org/api").is_ok());
    }

    #[test]
    fn test_validate_url_invalid_scheme() {
        assert!(validate_url("ftp://files.example.com").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_validate_url_malformed() {
        assert!(validate_url("http://x").is_err());
    }

    #[test]
    fn test_value_to_id_string() {
        let value = serde_json::json!("6617f2a9c0a1");
        assert_eq!(value_to_id(&value), Some("6617f2a9c0a1".to_string()));
    }

    #[test]
    fn test_value_to_id_number() {
        let value = serde_json::json!(42);
        assert_eq!(value_to_id(&value), Some("42".to_string()));
    }

    #[test]
    fn test_value_to_id_other_shapes_absent() {
        assert_eq!(value_to_id(&serde_json::json!(null)), None);
        assert_eq!(value_to_id(&serde_json::json!({"id": "nested"})), None);
        assert_eq!(value_to_id(&serde_json::json!([1, 2])), None);
    }

    #[test]
    fn test_payload_filename() {
        let payload = serde_json::json!({"filename": "a.png", "mimeType": "image/png"});
        assert_eq!(payload_filename(&payload), Some("a.png"));
        assert_eq!(payload_filename(&serde_json::json!({})), None);
    }

    #[test]
    fn test_create_http_client() {
        let client = create_http_client();
        assert!(client.get("http://example.com").build().is_ok());
    }
}
