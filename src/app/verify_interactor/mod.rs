// Verify interactor - Presence and playability checks over a mirrored tree

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// Interactor for output verification use case
///
/// Both checks only read the filesystem, so running them twice over an
/// unchanged tree gives the same result.
pub struct VerifyInteractor {
    video_source: Arc<dyn VideoSourcePort>,
    fs_port: Arc<dyn FsPort>,
    classifier: VideoClassifier,
}

impl VerifyInteractor {
    /// Create new verify interactor with injected ports
    pub fn new(
        video_source: Arc<dyn VideoSourcePort>,
        fs_port: Arc<dyn FsPort>,
        classifier: VideoClassifier,
    ) -> Self {
        Self {
            video_source,
            fs_port,
            classifier,
        }
    }

    /// Run both checks
    pub async fn execute(
        &self,
        source_root: &Path,
        dest_root: &Path,
        format: OutputFormat,
        skipped: &BTreeSet<PathBuf>,
    ) -> Result<VerificationResult, DomainError> {
        info!(
            source = %source_root.display(),
            dest = %dest_root.display(),
            %format,
            skipped = skipped.len(),
            "Verifying output tree"
        );

        let missing_files = self.presence_check(source_root, dest_root, format, skipped).await?;
        let unplayable_files = self.playability_check(dest_root)?;

        let result = VerificationResult {
            missing_files,
            unplayable_files,
        };
        if result.is_clean() {
            info!("Verification passed");
        } else {
            warn!(
                missing = result.missing_files.len(),
                unplayable = result.unplayable_files.len(),
                "Verification found problems"
            );
        }
        Ok(result)
    }

    /// Relative paths of every expected artifact absent from `dest_root`
    ///
    /// Videos expect their cropped output unless listed in `skipped`; other
    /// files and directories expect a counterpart at the same relative path.
    pub async fn presence_check(
        &self,
        source_root: &Path,
        dest_root: &Path,
        format: OutputFormat,
        skipped: &BTreeSet<PathBuf>,
    ) -> Result<BTreeSet<PathBuf>, DomainError> {
        if !source_root.is_dir() {
            return Err(DomainError::SourceNotFound(source_root.to_path_buf()));
        }

        let mut missing = BTreeSet::new();
        let walker = WalkDir::new(source_root)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !PathUtils::is_within(entry.path(), dest_root));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable source entry");
                    continue;
                }
            };
            let relative = match entry.path().strip_prefix(source_root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };

            let expected = if entry.file_type().is_dir() {
                if !self.fs_port.directory_exists(&dest_root.join(&relative)).await? {
                    debug!(path = %relative.display(), "Missing directory");
                    missing.insert(relative);
                }
                continue;
            } else if !entry.file_type().is_file() {
                continue;
            } else if self.classifier.is_video(entry.path()) {
                if skipped.contains(&relative) {
                    continue;
                }
                OutputNaming::cropped_relative_path(&relative, format)
            } else {
                relative
            };

            if !self.fs_port.file_exists(&dest_root.join(&expected)).await? {
                debug!(path = %expected.display(), "Missing file");
                missing.insert(expected);
            }
        }

        info!(missing = missing.len(), "Presence check finished");
        Ok(missing)
    }

    /// Relative paths of videos under `output_root` that fail to open
    pub fn playability_check(&self, output_root: &Path) -> Result<BTreeSet<PathBuf>, DomainError> {
        if !output_root.is_dir() {
            return Err(DomainError::SourceNotFound(output_root.to_path_buf()));
        }

        let mut unplayable = BTreeSet::new();
        let mut checked = 0usize;
        for entry in WalkDir::new(output_root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable output entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.classifier.is_video(entry.path()) {
                continue;
            }

            checked += 1;
            if !self.video_source.is_playable(entry.path()) {
                warn!(path = %entry.path().display(), "Output video does not open");
                let relative = entry
                    .path()
                    .strip_prefix(output_root)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| entry.path().to_path_buf());
                unplayable.insert(relative);
            }
        }

        info!(checked, unplayable = unplayable.len(), "Playability check finished");
        Ok(unplayable)
    }
}
