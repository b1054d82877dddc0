//! Error types for the storage module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while managing the artifact directory.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File system error on the artifact directory or one of its entries.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A client-supplied artifact name is not a single plain file name.
    #[error("invalid artifact name: {name}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// No artifact with this name exists.
    #[error("artifact not found: {name}")]
    NotFound {
        /// The requested name.
        name: String,
    },
}

impl StorageError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid-name error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Creates a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}
