//! Caller-facing error taxonomy.
//!
//! Engine and storage failures are re-classified here before they reach the
//! HTTP layer. Each kind has a fixed HTTP status; messages are either fixed
//! text or a sanitized engine diagnostic.

use thiserror::Error;

use crate::extract::{ExtractionError, ExtractionFailure};
use crate::storage::StorageError;

const INFO_FAILED_MESSAGE: &str =
    "Could not fetch info. The video might be private or link is invalid.";
const BLOCKED_MESSAGE: &str =
    "The platform is rate limiting or blocking requests from this server. Please retry later.";
const POST_PROCESSING_MESSAGE: &str = "Download failed processing.";

/// Errors returned by the job coordinator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing or malformed input (HTTP 400).
    #[error("{message}")]
    Validation {
        /// Caller-facing message.
        message: String,
    },

    /// The engine could not resolve or fetch the URL during a probe (HTTP 400).
    #[error("{message}")]
    Extraction {
        /// Caller-facing message.
        message: String,
    },

    /// The platform flagged the traffic as automated; retry later (HTTP 429).
    #[error("{message}")]
    UpstreamBlocked {
        /// Caller-facing message.
        message: String,
    },

    /// The engine failed during a download (HTTP 500).
    #[error("{message}")]
    DownloadFailed {
        /// Caller-facing message.
        message: String,
    },

    /// The engine reported success but no artifact was found (HTTP 500).
    #[error("{message}")]
    PostProcessing {
        /// Caller-facing message.
        message: String,
    },

    /// The requested artifact does not exist (HTTP 404).
    #[error("artifact not found: {name}")]
    NotFound {
        /// Requested artifact name.
        name: String,
    },

    /// The service itself is misconfigured or failed (HTTP 500).
    #[error("{message}")]
    Internal {
        /// Caller-facing message.
        message: String,
    },
}

impl ServiceError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// HTTP status code for this kind.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::Extraction { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::UpstreamBlocked { .. } => 429,
            Self::DownloadFailed { .. } | Self::PostProcessing { .. } | Self::Internal { .. } => {
                500
            }
        }
    }

    /// Stable label for logs.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Extraction { .. } => "extraction",
            Self::UpstreamBlocked { .. } => "upstream_blocked",
            Self::DownloadFailed { .. } => "download_failed",
            Self::PostProcessing { .. } => "post_processing",
            Self::NotFound { .. } => "not_found",
            Self::Internal { .. } => "internal",
        }
    }

    /// Re-classifies a probe failure.
    #[must_use]
    pub fn from_probe_failure(error: &ExtractionError) -> Self {
        match error.kind {
            ExtractionFailure::Blocked => Self::UpstreamBlocked {
                message: BLOCKED_MESSAGE.to_string(),
            },
            ExtractionFailure::EngineUnavailable => Self::internal(error.reason.clone()),
            ExtractionFailure::InvalidUrl
            | ExtractionFailure::Restricted
            | ExtractionFailure::PostProcessing
            | ExtractionFailure::TimedOut
            | ExtractionFailure::Other => Self::Extraction {
                message: INFO_FAILED_MESSAGE.to_string(),
            },
        }
    }

    /// Re-classifies a download failure.
    #[must_use]
    pub fn from_download_failure(error: &ExtractionError) -> Self {
        match error.kind {
            ExtractionFailure::Blocked => Self::UpstreamBlocked {
                message: BLOCKED_MESSAGE.to_string(),
            },
            ExtractionFailure::PostProcessing => Self::PostProcessing {
                message: POST_PROCESSING_MESSAGE.to_string(),
            },
            ExtractionFailure::EngineUnavailable => Self::internal(error.reason.clone()),
            ExtractionFailure::InvalidUrl
            | ExtractionFailure::Restricted
            | ExtractionFailure::TimedOut
            | ExtractionFailure::Other => Self::DownloadFailed {
                message: format!("Server Error: {}", error.reason),
            },
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound { name } | StorageError::InvalidName { name } => {
                Self::NotFound { name }
            }
            StorageError::Io { .. } => Self::internal("artifact storage is unavailable"),
        }
    }
}
