//! Job-level adapter: format negotiation, engine call, artifact lookup.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::format::negotiate_format;
use super::{EXTENSION_PLACEHOLDER, EngineRequest, ExtractionError, Extractor, ProbeResult};
use crate::job::Job;
use crate::storage::ArtifactStore;

/// Wraps an [`Extractor`] with the artifact directory it writes into.
#[derive(Clone)]
pub struct ExtractionAdapter {
    engine: Arc<dyn Extractor>,
    store: ArtifactStore,
}

impl std::fmt::Debug for ExtractionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionAdapter")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl ExtractionAdapter {
    /// Creates an adapter writing artifacts into `store`.
    #[must_use]
    pub fn new(engine: Arc<dyn Extractor>, store: ArtifactStore) -> Self {
        Self { engine, store }
    }

    /// Read-only metadata probe; never writes an artifact.
    ///
    /// # Errors
    ///
    /// Returns the engine's classified [`ExtractionError`].
    #[instrument(skip(self))]
    pub async fn probe(&self, url: &str) -> Result<ProbeResult, ExtractionError> {
        let result = self.engine.probe(url).await?;
        debug!(platform = ?result.platform, title = ?result.title, "probe succeeded");
        Ok(result)
    }

    /// Downloads the job's media and returns the artifact file name.
    ///
    /// The engine picks the final extension, so the artifact is found by
    /// listing the directory for the job's prefix once the engine returns.
    ///
    /// # Errors
    ///
    /// Returns the engine's classified [`ExtractionError`], or a
    /// post-processing error when the engine reported success but left no
    /// finished file behind.
    #[instrument(skip(self, job), fields(job_id = %job.id, url = %job.url, kind = job.kind.as_str(), quality = %job.quality))]
    pub async fn download(&self, job: &Job) -> Result<String, ExtractionError> {
        let prefix = job.id.as_prefix();
        let request = EngineRequest {
            url: job.url.clone(),
            output_template: self
                .store
                .dir()
                .join(format!("{prefix}.{EXTENSION_PLACEHOLDER}")),
            plan: negotiate_format(job.kind, &job.quality),
        };
        debug!(selector = %request.plan.selector, "negotiated format");

        self.engine.download(&request).await?;

        let store = self.store.clone();
        let lookup_prefix = prefix.clone();
        let lookup = tokio::task::spawn_blocking(move || store.find_artifact(&lookup_prefix)).await;

        match lookup {
            Ok(Ok(Some(filename))) => {
                info!(filename = %filename, "artifact ready");
                Ok(filename)
            }
            Ok(Ok(None)) => {
                warn!("engine reported success but no artifact matches the job prefix");
                Err(ExtractionError::post_processing(
                    &job.url,
                    "engine reported success but produced no file",
                ))
            }
            Ok(Err(err)) => {
                warn!(error = %err, "artifact lookup failed");
                Err(ExtractionError::post_processing(
                    &job.url,
                    "artifact directory could not be read",
                ))
            }
            Err(err) => {
                warn!(error = %err, "artifact lookup task failed");
                Err(ExtractionError::post_processing(
                    &job.url,
                    "artifact lookup was interrupted",
                ))
            }
        }
    }
}
