//! Error handling module for CropMirror

use crate::domain::errors::DomainError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type at the application boundary
#[derive(Error, Debug)]
pub enum CropMirrorError {
    /// Failure reported by the domain or its collaborators
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Report file could not be read or written
    #[error("Report file {path}: {source}")]
    ReportFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Report serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CropMirror operations
pub type CropMirrorResult<T> = std::result::Result<T, CropMirrorError>;
