//! Writes to the sink backend: document posts and media uploads.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::common::{create_http_client, payload_filename, value_to_id};
use crate::api::Document;
use crate::error::{Error, Result};
use crate::session::Authenticator;

/// Client for writing documents and media to the sink backend.
pub struct SinkClient {
    base_url: String,
    client: Client,
    cookie: Option<String>,
}

impl SinkClient {
    /// Create a client bound to an authenticated sink session.
    #[must_use]
    pub fn new(auth: &Authenticator) -> Self {
        Self {
            base_url: auth.endpoint().to_string(),
            client: create_http_client(),
            cookie: auth.cookie_header(),
        }
    }

    /// Builds the URL for a sink resource.
    fn url_for(&self, resource: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            resource.trim_start_matches('/')
        )
    }

    /// Attaches the session cookie to a request.
    fn with_session(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.cookie {
            Some(cookie) => request.header(reqwest::header::COOKIE, cookie),
            None => request,
        }
    }

    /// Post a document to a sink collection, returning the response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkConnection`] on transport failures and non-2xx
    /// statuses; the error message carries the response body so callers
    /// can log it.
    pub async fn post_document(&self, collection: &str, document: &Document) -> Result<Value> {
        let url = self.url_for(collection);
        let response = self
            .with_session(self.client.post(&url))
            .json(document)
            .send()
            .await
            .map_err(|e| Error::SinkConnection(format!("posting to '{collection}': {e}")))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(Error::SinkConnection(format!(
                "'{collection}' post returned {status}: {body}"
            )));
        }
        Ok(body)
    }

    /// Upload one file payload to the sink's media endpoint.
    ///
    /// A duplicate filename is resolved to the existing record's
    /// identifier via [`SinkClient::lookup_by_filename`]. Any other
    /// failure degrades to `None` and the calling document is posted with
    /// that field unresolved.
    pub async fn upload_media(&self, payload: &Value) -> Option<String> {
        let url = self.url_for("media");
        let response = match self
            .with_session(self.client.post(&url))
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("media upload request failed: {}", e);
                return None;
            }
        };

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("media upload returned {} with unreadable body: {}", status, e);
                return None;
            }
        };

        if status.is_success() {
            // A success without doc.id is an acceptable miss.
            return body
                .get("doc")
                .and_then(|doc| doc.get("id"))
                .and_then(value_to_id);
        }

        if status == StatusCode::BAD_REQUEST && is_duplicate_filename(&body) {
            let filename = payload_filename(payload)?;
            debug!("media '{}' already uploaded, reusing existing record", filename);
            return self.lookup_by_filename(filename).await;
        }

        warn!("media upload rejected with {}: {}", status, body);
        None
    }

    /// Look up a media record by filename, returning its identifier.
    ///
    /// Issues `GET {sink}/media?where[filename][equals]={name}` and takes
    /// the first match; empty or malformed responses yield `None`.
    pub async fn lookup_by_filename(&self, filename: &str) -> Option<String> {
        let url = self.url_for("media");
        let request = self.with_session(
            self.client
                .get(&url)
                .query(&[("where[filename][equals]", filename)]),
        );

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("media lookup for '{}' failed: {}", filename, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                "media lookup for '{}' returned {}",
                filename,
                response.status()
            );
            return None;
        }

        let body: Value = response.json().await.ok()?;
        let id = body
            .get("docs")
            .and_then(Value::as_array)
            .and_then(|docs| docs.first())
            .and_then(|doc| doc.get("id"))
            .and_then(value_to_id);
        if id.is_none() {
            warn!("media lookup for '{}' matched no records", filename);
        }
        id
    }
}

/// Whether a 400 body reports a filename uniqueness violation.
///
/// The sink nests field-level details under each error's `data` array;
/// older versions put `field`/`message` on the error itself. Both shapes
/// are accepted.
fn is_duplicate_filename(body: &Value) -> bool {
    let Some(errors) = body.get("errors").and_then(Value::as_array) else {
        return false;
    };
    errors.iter().any(|error| {
        let details: Vec<&Value> = match error.get("data").and_then(Value::as_array) {
            Some(data) => data.iter().collect(),
            None => vec![error],
        };
        details.into_iter().any(|detail| {
            detail.get("field").and_then(Value::as_str) == Some("filename")
                && detail
                    .get("message")
                    .and_then(Value::as_str)
                    .is_some_and(|m| m.to_lowercase().contains("must be unique"))
        })
    })
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
