//! Error types for annotation and label file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing project files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization error
    #[error("YAML error in {path:?}: {source}")]
    Yaml {
        /// File being read or written
        path: PathBuf,
        /// Underlying parser error
        source: serde_yaml::Error,
    },

    /// Image dimensions unusable for normalization
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },
}

impl FormatError {
    /// Create a YAML error for the given file.
    pub fn yaml(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }
}
