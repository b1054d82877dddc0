//! Job coordinator: one inbound request in, one job out.
//!
//! Requests are never coordinated with each other. There is no
//! deduplication and no shared in-flight cache; two identical requests run
//! two full, independent extractions under two different job identifiers.
//!
//! # Execution model
//!
//! Each download runs its adapter call in a dedicated Tokio task, so it keeps
//! running to completion (or hard failure) even if the HTTP client goes away.
//! A process-wide semaphore caps how many engine downloads run at once;
//! probes are not capped. No lock is held across an engine call.

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{Job, JobId, MediaKind, Quality, ServiceError};
use crate::config::ServiceConfig;
use crate::extract::{ExtractionAdapter, Extractor, ProbeResult};
use crate::storage::ArtifactStore;

/// Public path under which artifacts are served.
pub const DOWNLOADS_ROUTE: &str = "/downloads";

/// Successful download outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Identifier of the job that produced the artifact.
    pub job_id: JobId,
    /// Artifact file name inside the artifact directory.
    pub filename: String,
    /// Retrieval path for the artifact (`/downloads/<filename>`).
    pub download_url: String,
}

/// Orchestrates probes and downloads end-to-end.
#[derive(Debug)]
pub struct JobCoordinator {
    adapter: ExtractionAdapter,
    store: ArtifactStore,
    download_slots: Arc<Semaphore>,
}

impl JobCoordinator {
    /// Creates a coordinator over `engine`, writing into the configured directory.
    #[must_use]
    pub fn new(config: &ServiceConfig, engine: Arc<dyn Extractor>) -> Self {
        let store = ArtifactStore::new(&config.download_dir, config.retention);
        Self {
            adapter: ExtractionAdapter::new(engine, store.clone()),
            store,
            download_slots: Arc::new(Semaphore::new(config.max_concurrent_downloads)),
        }
    }

    /// Returns the artifact store shared with the file route.
    #[must_use]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Probes `url` for metadata. Never writes an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for a missing or malformed URL,
    /// [`ServiceError::UpstreamBlocked`] when the platform blocks the server,
    /// and [`ServiceError::Extraction`] for any other engine failure.
    #[instrument(skip(self))]
    pub async fn handle_info(&self, url: Option<&str>) -> Result<ProbeResult, ServiceError> {
        let url = validate_url(url)?;
        self.adapter.probe(&url).await.map_err(|err| {
            warn!(kind = %err.kind, reason = %err.reason, "probe failed");
            ServiceError::from_probe_failure(&err)
        })
    }

    /// Runs one download job and returns where its artifact can be fetched.
    ///
    /// Expired artifacts are swept first, before this job writes anything, so
    /// a request never purges its own output.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for a missing or malformed URL,
    /// [`ServiceError::UpstreamBlocked`] when the platform blocks the server,
    /// [`ServiceError::PostProcessing`] when the engine reported success but
    /// left no artifact, and [`ServiceError::DownloadFailed`] otherwise.
    #[instrument(skip(self, kind, quality), fields(kind = kind.as_str(), quality = %quality))]
    pub async fn handle_download(
        &self,
        url: Option<&str>,
        kind: MediaKind,
        quality: Quality,
    ) -> Result<DownloadOutcome, ServiceError> {
        let url = validate_url(url)?;
        let job = Job::new(url, kind, quality);
        info!(job_id = %job.id, url = %job.url, "download job created");

        self.purge_expired().await;

        let adapter = self.adapter.clone();
        let store = self.store.clone();
        let slots = Arc::clone(&self.download_slots);
        let task_job = job.clone();
        let handle = tokio::spawn(async move {
            let _permit = slots.acquire_owned().await.ok();
            let result = adapter.download(&task_job).await;
            if let Err(err) = &result {
                warn!(job_id = %task_job.id, kind = %err.kind, reason = %err.reason, "download job failed");
                discard_job_files(store, &task_job.id).await;
            }
            result
        });

        let result = match handle.await {
            Ok(result) => result,
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "download task aborted");
                discard_job_files(self.store.clone(), &job.id).await;
                return Err(ServiceError::internal("download task aborted"));
            }
        };

        let filename = result.map_err(|err| ServiceError::from_download_failure(&err))?;
        let download_url = format!("{DOWNLOADS_ROUTE}/{filename}");
        info!(job_id = %job.id, filename = %filename, "download job finished");
        Ok(DownloadOutcome {
            job_id: job.id,
            filename,
            download_url,
        })
    }

    async fn purge_expired(&self) {
        let store = self.store.clone();
        let now = SystemTime::now();
        match tokio::task::spawn_blocking(move || store.purge_expired(now)).await {
            Ok(report) => debug!(?report, "pre-download purge done"),
            Err(err) => warn!(error = %err, "purge task failed"),
        }
    }
}

/// Removes whatever a failed job left behind. Runs inside the job's own task
/// so the sweep happens even when the requesting future is dropped.
async fn discard_job_files(store: ArtifactStore, job_id: &JobId) {
    let prefix = job_id.as_prefix();
    if let Err(err) = tokio::task::spawn_blocking(move || store.remove_job_files(&prefix)).await {
        warn!(job_id = %job_id, error = %err, "leftover cleanup task failed");
    }
}

/// Checks that `url` is present and is an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`ServiceError::Validation`] otherwise.
pub fn validate_url(url: Option<&str>) -> Result<String, ServiceError> {
    let url = url.map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return Err(ServiceError::validation("URL is required"));
    }
    let parsed = Url::parse(url).map_err(|_| ServiceError::validation("URL is not valid"))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
        return Err(ServiceError::validation("URL must be an http(s) link"));
    }
    Ok(url.to_string())
}
