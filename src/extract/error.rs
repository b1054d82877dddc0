//! Error types for the extraction adapter.
//!
//! Every failure coming out of the engine (non-zero exit, unreadable output,
//! timeout, missing binary, missing artifact) is caught at the adapter
//! boundary and turned into an [`ExtractionError`] carrying an
//! [`ExtractionFailure`] kind, so nothing above the adapter looks at raw
//! engine text.

use std::fmt;

use thiserror::Error;

/// Classification of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// The URL is malformed or no extractor supports it.
    InvalidUrl,
    /// Content exists but is private, removed, region-locked or age-gated.
    Restricted,
    /// The platform detected automated traffic (bot check, sign-in wall, HTTP 429).
    Blocked,
    /// The engine reported success (or failed while converting) but no usable artifact exists.
    PostProcessing,
    /// The engine binary could not be started.
    EngineUnavailable,
    /// The engine did not finish within the configured bound.
    TimedOut,
    /// Any other engine failure.
    Other,
}

impl ExtractionFailure {
    /// Stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Restricted => "restricted",
            Self::Blocked => "blocked",
            Self::PostProcessing => "post_processing",
            Self::EngineUnavailable => "engine_unavailable",
            Self::TimedOut => "timed_out",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified engine failure for one URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("extraction failed ({kind}) for {url}: {reason}")]
pub struct ExtractionError {
    /// Failure classification.
    pub kind: ExtractionFailure,
    /// URL the engine was working on.
    pub url: String,
    /// Sanitized diagnostic, safe to show to callers.
    pub reason: String,
}

impl ExtractionError {
    /// Creates an error of the given kind.
    pub fn new(kind: ExtractionFailure, url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a post-processing error (success reported, no artifact found).
    pub fn post_processing(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ExtractionFailure::PostProcessing, url, reason)
    }

    /// Creates a timeout error.
    pub fn timed_out(url: impl Into<String>, after_secs: u64) -> Self {
        Self::new(
            ExtractionFailure::TimedOut,
            url,
            format!("engine did not finish within {after_secs}s"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_display_names_kind_and_url() {
        let error = ExtractionError::new(
            ExtractionFailure::Restricted,
            "https://example.com/v/1",
            "Private video",
        );
        let msg = error.to_string();
        assert!(msg.contains("restricted"), "Expected kind in: {msg}");
        assert!(msg.contains("https://example.com/v/1"), "Expected URL in: {msg}");
        assert!(msg.contains("Private video"), "Expected reason in: {msg}");
    }

    #[test]
    fn test_timed_out_reason_mentions_bound() {
        let error = ExtractionError::timed_out("https://example.com", 60);
        assert_eq!(error.kind, ExtractionFailure::TimedOut);
        assert!(error.reason.contains("60s"));
    }
}
