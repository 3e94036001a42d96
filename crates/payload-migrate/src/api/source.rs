//! Paginated collection reads from the source backend.
//!
//! Collections are exposed as `GET {source}/{collection}?page={n}` with a
//! `{docs, page, totalPages}` envelope.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::api::common::create_http_client;
use crate::api::{Document, FetchedPage};
use crate::error::{Error, Result};
use crate::session::Authenticator;

/// Page envelope returned by the source's collection endpoint.
#[derive(Debug, Deserialize)]
struct PageEnvelope {
    docs: Vec<Document>,
    page: u32,
    #[serde(rename = "totalPages")]
    total_pages: u32,
}

/// Client for reading collections from the source backend.
pub struct SourceClient {
    base_url: String,
    client: Client,
    cookie: Option<String>,
}

impl SourceClient {
    /// Create a client bound to an authenticated source session.
    #[must_use]
    pub fn new(auth: &Authenticator) -> Self {
        Self {
            base_url: auth.endpoint().to_string(),
            client: create_http_client(),
            cookie: auth.cookie_header(),
        }
    }

    /// Builds the URL for a collection.
    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            collection.trim_start_matches('/')
        )
    }

    /// Fetch one page of a collection.
    ///
    /// Restartable at any page number; callers drive the pagination loop
    /// with [`FetchedPage::has_more`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceConnection`] on transport failures and
    /// non-2xx statuses, [`Error::Extraction`] when the envelope cannot
    /// be parsed. Callers treat either as end-of-data for the collection.
    pub async fn fetch_page(&self, collection: &str, page: u32) -> Result<FetchedPage> {
        let url = self.collection_url(collection);
        let mut request = self.client.get(&url).query(&[("page", page.to_string())]);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| {
            Error::SourceConnection(format!("fetching '{collection}' page {page}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::SourceConnection(format!(
                "'{collection}' page {page} returned {status}: {body}"
            )));
        }

        let envelope: PageEnvelope = response.json().await.map_err(|e| {
            Error::Extraction(format!("'{collection}' page {page} envelope: {e}"))
        })?;

        debug!(
            "fetched '{}' page {}/{} ({} docs)",
            collection,
            envelope.page,
            envelope.total_pages,
            envelope.docs.len()
        );

        Ok(FetchedPage {
            docs: envelope.docs,
            page: envelope.page,
            total_pages: envelope.total_pages,
        })
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
