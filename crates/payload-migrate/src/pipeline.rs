//! Migration pipeline orchestration.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::api::sink::SinkClient;
use crate::api::source::SourceClient;
use crate::config::MigrationOptions;
use crate::error::Result;
use crate::manifest::{CollectionSpec, Manifest};
use crate::session::Authenticator;
use crate::transform::Transformer;

/// Migration statistics.
#[derive(Debug, Default, Clone)]
pub struct MigrationStats {
    /// Collections migrated (after filtering).
    pub collections: u64,
    /// Documents fetched from the source.
    pub fetched: u64,
    /// Documents accepted by the sink.
    pub posted: u64,
    /// Documents the sink rejected.
    pub failed: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl MigrationStats {
    /// Calculate throughput (documents posted per second).
    #[must_use]
    pub fn throughput(&self) -> f64 {
        if self.duration_secs > 0.0 {
            self.posted as f64 / self.duration_secs
        } else {
            0.0
        }
    }
}

/// Migration pipeline: source pagination, upload-field transformation and
/// sink posts, strictly sequential.
pub struct Pipeline {
    source: SourceClient,
    sink: SinkClient,
    options: MigrationOptions,
}

impl Pipeline {
    /// Create a pipeline between two authenticated backends.
    #[must_use]
    pub fn new(source: &Authenticator, sink: &Authenticator, options: MigrationOptions) -> Self {
        Self {
            source: SourceClient::new(source),
            sink: SinkClient::new(sink),
            options,
        }
    }

    /// Load a manifest file and run it.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or is invalid.
    pub async fn run_file(&self, path: &Path) -> Result<MigrationStats> {
        let manifest = Manifest::from_file(path)?;
        Ok(self.run(&manifest).await)
    }

    /// Migrate every collection in `manifest` that passes the configured
    /// filter.
    ///
    /// Collections are processed in manifest order; a collection's failure
    /// ends that collection only. There is no rollback: partially migrated
    /// collections are left as-is.
    pub async fn run(&self, manifest: &Manifest) -> MigrationStats {
        let start = std::time::Instant::now();
        let mut stats = MigrationStats::default();

        info!("starting migration of {} collections", manifest.collections.len());

        for spec in &manifest.collections {
            if !self.options.includes(&spec.name) {
                debug!("skipping collection '{}' (filtered out)", spec.name);
                continue;
            }
            stats.collections += 1;
            self.migrate_collection(spec, &mut stats).await;
        }

        stats.duration_secs = start.elapsed().as_secs_f64();

        info!(
            "migration complete: {} collections, {} fetched, {} posted, {} failed in {:.2}s ({:.0} docs/sec)",
            stats.collections,
            stats.fetched,
            stats.posted,
            stats.failed,
            stats.duration_secs,
            stats.throughput()
        );

        stats
    }

    async fn migrate_collection(&self, spec: &CollectionSpec, stats: &mut MigrationStats) {
        info!("migrating collection '{}'", spec.name);
        let transformer = Transformer::new(&self.sink);
        let progress = create_progress_bar(&spec.name);

        let mut page = 1;
        loop {
            // A failed fetch ends this collection, not the run.
            let fetched = match self.source.fetch_page(&spec.name, page).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("collection '{}' ended at page {}: {}", spec.name, page, e);
                    break;
                }
            };

            let has_more = fetched.has_more();
            let next_page = fetched.page + 1;

            for document in fetched.docs {
                stats.fetched += 1;
                progress.inc(1);

                if self.options.dry_run {
                    stats.posted += 1;
                    continue;
                }

                let document = if spec.upload_fields.is_empty() {
                    document
                } else {
                    transformer.transform(document, spec).await
                };

                match self.sink.post_document(&spec.name, &document).await {
                    Ok(body) => {
                        stats.posted += 1;
                        debug!("'{}' accepted document: {}", spec.name, body);
                    }
                    Err(e) => {
                        stats.failed += 1;
                        warn!("'{}' post failed: {}", spec.name, e);
                    }
                }
            }

            if !has_more {
                break;
            }
            page = next_page;
        }

        progress.finish_with_message(format!("'{}' done", spec.name));
    }
}

fn create_progress_bar(collection: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}: {pos} documents")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(collection.to_string());
    pb
}
