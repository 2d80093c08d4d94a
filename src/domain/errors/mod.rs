// Domain errors - Error types for the domain layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Input video or file missing at traversal time
    SourceNotFound(PathBuf),
    /// Rectangle fails the validity predicate
    InvalidRoi(String),
    /// The decode collaborator cannot open or read a frame
    DecodeFailure { path: PathBuf, message: String },
    /// Encode request refused before the transcoder was started
    EncodeRejected { path: PathBuf, reason: String },
    /// External transcoder could not run or exited non-zero
    TranscoderFailed {
        path: PathBuf,
        exit_code: Option<i32>,
        diagnostics: String,
    },
    /// Copying a non-video file into the mirror failed
    CopyFailure { path: PathBuf, cause: String },
    /// Filesystem operation failed
    FsFail(String),
    /// Configuration is invalid
    Config(String),
    /// Operator console failed
    Ui(String),
    /// Internal error
    InternalError(String),
}

impl DomainError {
    /// Path of the item the error refers to, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            DomainError::SourceNotFound(path) => Some(path),
            DomainError::DecodeFailure { path, .. }
            | DomainError::EncodeRejected { path, .. }
            | DomainError::TranscoderFailed { path, .. }
            | DomainError::CopyFailure { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::SourceNotFound(path) => write!(f, "Source not found: {}", path.display()),
            DomainError::InvalidRoi(msg) => write!(f, "Invalid ROI: {}", msg),
            DomainError::DecodeFailure { path, message } => {
                write!(f, "Cannot decode {}: {}", path.display(), message)
            }
            DomainError::EncodeRejected { path, reason } => {
                write!(f, "Encode of {} rejected: {}", path.display(), reason)
            }
            DomainError::TranscoderFailed {
                path,
                exit_code,
                diagnostics,
            } => {
                match exit_code {
                    Some(code) => write!(
                        f,
                        "Transcoder failed on {} (exit code {})",
                        path.display(),
                        code
                    )?,
                    None => write!(f, "Transcoder failed on {}", path.display())?,
                }
                if !diagnostics.is_empty() {
                    write!(f, ": {}", diagnostics)?;
                }
                Ok(())
            }
            DomainError::CopyFailure { path, cause } => {
                write!(f, "Failed to copy {}: {}", path.display(), cause)
            }
            DomainError::FsFail(msg) => write!(f, "Filesystem error: {}", msg),
            DomainError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::Ui(msg) => write!(f, "Operator console error: {}", msg),
            DomainError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
