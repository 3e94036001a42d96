//! Collection manifests.
//!
//! A manifest is a JSON file enumerating the collections to migrate and,
//! for each, which of its fields are file uploads:
//!
//! ```json
//! {
//!   "collections": [
//!     { "name": "donors", "upload_fields": ["logo"] },
//!     { "name": "articles" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One collection to migrate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Collection name, as exposed by both backends' REST APIs.
    pub name: String,
    /// Fields holding file payloads that must be re-uploaded to the sink
    /// before the document is posted. Processed in declaration order.
    #[serde(default)]
    pub upload_fields: Vec<String>,
}

/// A manifest file's contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Collections to migrate, in order.
    pub collections: Vec<CollectionSpec>,
}

impl Manifest {
    /// Load a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Manifest(format!("{}: {e}", path.display())))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] on empty or duplicate collection names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.collections {
            if spec.name.is_empty() {
                return Err(Error::Manifest("collection name cannot be empty".to_string()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::Manifest(format!(
                    "duplicate collection '{}'",
                    spec.name
                )));
            }
        }
        Ok(())
    }
}

/// Enumerate the manifest files in a directory.
///
/// Returns the `.json` files directly under `dir`, sorted by name so runs
/// are deterministic.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn discover_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
