//! Path utilities for source and destination roots

use crate::domain::errors::DomainError;
use std::path::{Path, PathBuf};

/// Path helpers shared by the tree walkers
pub struct PathUtils;

impl PathUtils {
    /// Canonical form of `path`, or the path itself when it cannot be resolved
    pub fn canonical_or_self(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }

    /// Whether `path` is `root` or lies beneath it
    pub fn is_within(path: &Path, root: &Path) -> bool {
        Self::canonical_or_self(path).starts_with(Self::canonical_or_self(root))
    }

    /// Reject a batch whose destination is the source itself
    pub fn validate_roots(source_root: &Path, dest_root: &Path) -> Result<(), DomainError> {
        if !source_root.is_dir() {
            return Err(DomainError::SourceNotFound(source_root.to_path_buf()));
        }
        if Self::canonical_or_self(source_root) == Self::canonical_or_self(dest_root) {
            return Err(DomainError::BadArgs(format!(
                "destination {} is the source directory",
                dest_root.display()
            )));
        }
        if dest_root.is_file() {
            return Err(DomainError::BadArgs(format!(
                "destination {} is a file",
                dest_root.display()
            )));
        }
        Ok(())
    }
}
