//! Jobs and their coordination.
//!
//! - [`Job`] / [`JobId`] - one download request and its identifier
//! - [`MediaKind`] / [`Quality`] - what the caller asked for
//! - [`JobCoordinator`] - turns requests into probes and download jobs
//! - [`ServiceError`] - the caller-facing error taxonomy

mod coordinator;
mod error;
mod model;

pub use coordinator::{DOWNLOADS_ROUTE, DownloadOutcome, JobCoordinator, validate_url};
pub use error::ServiceError;
pub use model::{Job, JobId, MediaKind, Quality};
