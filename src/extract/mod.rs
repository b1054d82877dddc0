//! Extraction adapter around the external media engine.
//!
//! This is the only part of the crate that talks to the engine. It hides the
//! engine's configuration surface (User-Agent spoofing, client impersonation,
//! certificate-check bypass, cache disabling) and turns every engine failure
//! into a classified [`ExtractionError`].
//!
//! # Overview
//!
//! - [`Extractor`] - the engine boundary: probe a URL, or download it to a
//!   given output template
//! - [`YtDlpExtractor`] - [`Extractor`] backed by a `yt-dlp` subprocess
//! - [`ExtractionAdapter`] - negotiates the format plan, invokes the engine,
//!   and maps the job identifier back to the artifact the engine wrote
//! - [`negotiate_format`] - the quality-to-format table

mod adapter;
mod classify;
mod error;
mod format;
mod ytdlp;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

pub use adapter::ExtractionAdapter;
pub use error::{ExtractionError, ExtractionFailure};
pub use format::{
    AUDIO_BITRATE_KBPS, AUDIO_CODEC, AudioTranscode, FormatPlan, VIDEO_CONTAINER, negotiate_format,
};
pub use ytdlp::YtDlpExtractor;

/// Placeholder the engine replaces with the extension it settles on.
pub const EXTENSION_PLACEHOLDER: &str = "%(ext)s";

/// Metadata returned by a probe. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// Media title.
    pub title: Option<String>,
    /// Thumbnail image URL.
    pub thumbnail: Option<String>,
    /// Human-readable duration (`m:ss` or `h:mm:ss`).
    pub duration: Option<String>,
    /// Source platform identifier (e.g. `Youtube`, `Instagram`).
    pub platform: Option<String>,
}

/// One download handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    /// Media page URL.
    pub url: String,
    /// Output path template, ending in [`EXTENSION_PLACEHOLDER`].
    pub output_template: PathBuf,
    /// Negotiated format options.
    pub plan: FormatPlan,
}

/// The external extraction engine, reached as a black box.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Resolves metadata for `url` without writing any file.
    async fn probe(&self, url: &str) -> Result<ProbeResult, ExtractionError>;

    /// Downloads `request.url` to `request.output_template`, replacing the
    /// extension placeholder with the format it negotiates.
    async fn download(&self, request: &EngineRequest) -> Result<(), ExtractionError>;
}
