//! Error types for workspace and package loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading packages or model files from disk.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// IO error while reading a file or walking a directory.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed package descriptor.
    #[error("invalid package descriptor {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The directory to load does not exist.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Directory traversal failed.
    #[error("failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

impl ProjectError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
