//! Service configuration.
//!
//! A [`ServiceConfig`] is assembled once at process start (from CLI flags and
//! environment variables in `main`), validated, and then shared read-only via
//! `Arc` with the storage manager, extraction adapter and coordinator. Nothing
//! mutates it after startup.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::storage::DEFAULT_RETENTION;
use crate::user_agent::default_browser_user_agent;

/// Default artifact directory, relative to the working directory.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Default engine executable, resolved through `PATH`.
pub const DEFAULT_ENGINE_BINARY: &str = "yt-dlp";

/// Default bound on a metadata probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default bound on a full download (including transcoding).
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(1800);

/// Default cap on simultaneous engine downloads.
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 16;

const MAX_RETENTION_SECS: u64 = 7 * 24 * 3600;
const MAX_PROBE_TIMEOUT_SECS: u64 = 3600;
const MAX_DOWNLOAD_TIMEOUT_SECS: u64 = 24 * 3600;
const MAX_CONCURRENT_DOWNLOADS: usize = 100;

/// Errors produced while validating configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric setting fell outside its accepted range.
    #[error("invalid value for `{field}`: {value}. Expected range: {min}..={max}")]
    OutOfRange {
        /// Name of the offending setting.
        field: &'static str,
        /// Value that was supplied.
        value: u64,
        /// Inclusive lower bound.
        min: u64,
        /// Inclusive upper bound.
        max: u64,
    },

    /// A string setting was present but blank.
    #[error("invalid value for `{field}`: must not be empty")]
    Empty {
        /// Name of the offending setting.
        field: &'static str,
    },
}

/// Options forwarded to the extraction engine on every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Engine executable (name on `PATH` or absolute path).
    pub binary: PathBuf,
    /// User-Agent the engine presents upstream.
    pub user_agent: String,
    /// Optional client impersonation target (e.g. `chrome`, `safari-17`).
    pub impersonate: Option<String>,
    /// Ordered client identities the engine tries in turn (e.g. `android`, `web`).
    pub client_profiles: Vec<String>,
    /// Upper bound on a metadata probe.
    pub probe_timeout: Duration,
    /// Upper bound on a download, including post-processing.
    pub download_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_ENGINE_BINARY),
            user_agent: default_browser_user_agent(),
            impersonate: None,
            client_profiles: Vec::new(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }
}

/// Immutable, process-wide service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Directory holding downloaded artifacts.
    pub download_dir: PathBuf,
    /// Maximum artifact age before the sweep deletes it.
    pub retention: Duration,
    /// Cap on simultaneous engine downloads across all requests.
    pub max_concurrent_downloads: usize,
    /// Engine invocation options.
    pub engine: EngineConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            retention: DEFAULT_RETENTION,
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            engine: EngineConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Creates a default configuration rooted at `download_dir`.
    #[must_use]
    pub fn with_download_dir(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            ..Self::default()
        }
    }

    /// Validates every setting against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.download_dir.as_os_str().is_empty() {
            return Err(ConfigError::Empty {
                field: "download_dir",
            });
        }
        validate_secs("retention_secs", self.retention, MAX_RETENTION_SECS)?;
        validate_range(
            "max_concurrent_downloads",
            self.max_concurrent_downloads as u64,
            1,
            MAX_CONCURRENT_DOWNLOADS as u64,
        )?;

        let engine = &self.engine;
        if engine.binary.as_os_str().is_empty() {
            return Err(ConfigError::Empty { field: "yt_dlp" });
        }
        if engine.user_agent.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "user_agent",
            });
        }
        if engine
            .impersonate
            .as_deref()
            .is_some_and(|target| target.trim().is_empty())
        {
            return Err(ConfigError::Empty {
                field: "impersonate",
            });
        }
        if engine.client_profiles.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Empty {
                field: "client_profile",
            });
        }
        validate_secs(
            "probe_timeout_secs",
            engine.probe_timeout,
            MAX_PROBE_TIMEOUT_SECS,
        )?;
        validate_secs(
            "download_timeout_secs",
            engine.download_timeout,
            MAX_DOWNLOAD_TIMEOUT_SECS,
        )?;
        Ok(())
    }
}

fn validate_secs(field: &'static str, value: Duration, max: u64) -> Result<(), ConfigError> {
    validate_range(field, value.as_secs(), 1, max)
}

fn validate_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
