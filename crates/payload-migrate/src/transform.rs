//! Document transformation: upload-field rewriting.

use serde_json::Value;
use tracing::debug;

use crate::api::sink::SinkClient;
use crate::api::Document;
use crate::manifest::CollectionSpec;

/// Rewrites a document's declared upload fields before it is posted.
///
/// Each upload field's file payload is re-uploaded to the sink and the
/// field is replaced with the resulting media identifier, or JSON `null`
/// when the upload could not be resolved. Raw file payloads never reach
/// the sink's document endpoint.
pub struct Transformer<'a> {
    sink: &'a SinkClient,
}

impl<'a> Transformer<'a> {
    /// Create a transformer uploading through `sink`.
    #[must_use]
    pub fn new(sink: &'a SinkClient) -> Self {
        Self { sink }
    }

    /// Transform one document according to its collection spec.
    ///
    /// Fields are processed in declaration order. Absent or null fields
    /// are skipped without a network call, and one field's failed upload
    /// does not abort the remaining fields.
    pub async fn transform(&self, mut document: Document, spec: &CollectionSpec) -> Document {
        for field in &spec.upload_fields {
            let Some(payload) = document.get(field).cloned() else {
                debug!("upload field '{}' absent, skipping", field);
                continue;
            };
            if payload.is_null() {
                continue;
            }

            let replacement = match self.sink.upload_media(&payload).await {
                Some(id) => Value::String(id),
                None => Value::Null,
            };
            if let Some(object) = document.as_object_mut() {
                object.insert(field.clone(), replacement);
            }
        }
        document
    }
}
