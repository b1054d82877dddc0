//! Artifact directory management.
//!
//! The artifact directory is the only shared mutable resource in the service.
//! It holds a flat list of `{job_id}.{extension}` files; the directory listing
//! is the only index.
//!
//! # Overview
//!
//! - [`ArtifactStore`] - owns the directory, runs the retention sweep, and
//!   resolves job prefixes and client-supplied names to files
//! - [`PurgeReport`] - outcome counters of one retention sweep
//! - [`StorageError`] - operation error types
//!
//! # Concurrency
//!
//! Writers never collide because every job writes under a fresh identifier.
//! A sweep may interleave with a job that is still writing; the age check
//! alone keeps fresh output alive, so no locking is involved.
//!
//! # Example
//!
//! ```no_run
//! use std::time::SystemTime;
//! use grabber_core::storage::{ArtifactStore, DEFAULT_RETENTION};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ArtifactStore::new("downloads", DEFAULT_RETENTION);
//! store.ensure_directory_exists()?;
//! let report = store.purge_expired(SystemTime::now());
//! println!("removed {} expired artifacts", report.removed);
//! # Ok(())
//! # }
//! ```

mod error;
mod name;
mod store;

pub use error::StorageError;
pub use name::{is_intermediate_file, is_safe_artifact_name, matches_job_prefix};
pub use store::{ArtifactStore, DEFAULT_RETENTION, PurgeReport};
