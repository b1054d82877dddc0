//! Media Grabber Core Library
//!
//! This library provides the core of the media grabber service, which accepts
//! a media URL, hands extraction and download to an external engine (yt-dlp),
//! and serves the resulting file from a local artifact directory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Immutable service configuration, built once at startup
//! - [`storage`] - Artifact directory management and retention sweep
//! - [`extract`] - Extraction adapter wrapping the external engine
//! - [`job`] - Job model, coordinator, and caller-facing error taxonomy
//! - [`server`] - HTTP surface (axum router and handlers)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod extract;
pub mod job;
pub mod server;
pub mod storage;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, ServiceConfig};
pub use extract::{
    EngineRequest, ExtractionAdapter, ExtractionError, ExtractionFailure, Extractor, FormatPlan,
    ProbeResult, YtDlpExtractor, negotiate_format,
};
pub use job::{DownloadOutcome, Job, JobCoordinator, JobId, MediaKind, Quality, ServiceError};
pub use server::{AppState, build_router};
pub use storage::{ArtifactStore, DEFAULT_RETENTION, PurgeReport, StorageError};
pub use user_agent::default_browser_user_agent;
