//! Artifact directory owner: creation, retention sweep, and lookups.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, instrument, warn};

use super::StorageError;
use super::name::{is_safe_artifact_name, matches_job_prefix};

/// Default retention threshold (1 hour).
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);

/// Outcome of one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Entries deleted because they were older than the threshold.
    pub removed: usize,
    /// Entries young enough to keep.
    pub kept: usize,
    /// Expired entries whose deletion failed (logged and skipped).
    pub failed: usize,
}

/// Owner of the artifact directory.
///
/// Cheap to clone; holds only the directory path and the retention threshold.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    retention: Duration,
}

impl ArtifactStore {
    /// Creates a store over `dir` that expires artifacts older than `retention`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }

    /// Returns the artifact directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the artifact directory if it is missing. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn ensure_directory_exists(&self) -> Result<(), StorageError> {
        if self.dir.is_dir() {
            debug!("artifact directory already present");
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        info!("created artifact directory");
        Ok(())
    }

    /// Deletes every artifact older than the configured retention threshold.
    ///
    /// See [`ArtifactStore::purge_older_than`].
    pub fn purge_expired(&self, now: SystemTime) -> PurgeReport {
        self.purge_older_than(now, self.retention)
    }

    /// Deletes every file whose last modification is more than `max_age` before `now`.
    ///
    /// The sweep is best-effort: an unreadable directory, an entry that
    /// vanished mid-sweep, or a failed delete is logged and skipped, never
    /// returned. Entries at or under `max_age`, and entries stamped in the
    /// future, are always kept, so output still being written survives.
    #[instrument(skip(self), fields(dir = %self.dir.display(), max_age_secs = max_age.as_secs()))]
    pub fn purge_older_than(&self, now: SystemTime, max_age: Duration) -> PurgeReport {
        let mut report = PurgeReport::default();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "cannot list artifact directory, skipping purge");
                return report;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "entry vanished during purge");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(modified) = metadata.modified() else {
                report.kept += 1;
                continue;
            };

            let expired = now
                .duration_since(modified)
                .is_ok_and(|age| age > max_age);
            if !expired {
                report.kept += 1;
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "removed expired artifact");
                    report.removed += 1;
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "expired artifact already gone");
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to remove expired artifact");
                    report.failed += 1;
                }
            }
        }

        if report.removed > 0 || report.failed > 0 {
            info!(
                removed = report.removed,
                failed = report.failed,
                kept = report.kept,
                "artifact purge finished"
            );
        }
        report
    }

    /// Finds the finished artifact written under the job identifier `prefix`.
    ///
    /// Engine intermediates are ignored. If more than one finished file
    /// matches, the lexicographically first name wins so the result is stable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be listed.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn find_artifact(&self, prefix: &str) -> Result<Option<String>, StorageError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let mut matches: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| matches_job_prefix(name, prefix))
            .collect();
        matches.sort();

        if matches.len() > 1 {
            warn!(count = matches.len(), "multiple artifacts share one job prefix");
        }
        Ok(matches.into_iter().next())
    }

    /// Removes every file whose name starts with `prefix`, including intermediates.
    ///
    /// Best-effort cleanup for failed jobs; returns the number of files removed.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn remove_job_files(&self, prefix: &str) -> usize {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let is_job_file = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(prefix));
            if !is_job_file {
                continue;
            }
            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to remove job leftover");
                }
            }
        }
        if removed > 0 {
            debug!(removed, "removed leftovers of failed job");
        }
        removed
    }

    /// Resolves a client-supplied artifact name to a path inside the directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidName`] if `name` is not a single plain
    /// file name and [`StorageError::NotFound`] if no such file exists.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        if !is_safe_artifact_name(name) {
            return Err(StorageError::invalid_name(name));
        }
        let path = self.dir.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(StorageError::not_found(name)),
        }
    }
}
