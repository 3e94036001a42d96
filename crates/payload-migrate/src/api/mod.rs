//! HTTP clients for the source and sink backends.

pub mod common;
pub mod sink;
pub mod source;

/// A document as exposed by a backend collection: an arbitrary JSON
/// object of field name to value.
pub type Document = serde_json::Value;

/// One page of documents fetched from a source collection.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Documents on this page, in collection order.
    pub docs: Vec<Document>,
    /// Page number as reported by the source.
    pub page: u32,
    /// Total page count as reported by the source.
    pub total_pages: u32,
}

impl FetchedPage {
    /// Whether another page follows this one.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}
