// Mirror interactor - Recreates the source tree without its videos

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// Interactor for the tree mirroring use case
pub struct MirrorInteractor {
    fs_port: Arc<dyn FsPort>,
    classifier: VideoClassifier,
}

impl MirrorInteractor {
    /// Create new mirror interactor with injected ports
    pub fn new(fs_port: Arc<dyn FsPort>, classifier: VideoClassifier) -> Self {
        Self {
            fs_port,
            classifier,
        }
    }

    /// Mirror `source_root` into `dest_root`
    ///
    /// Every directory is recreated, including ones without files, and every
    /// non-video file is copied with its modification time. Videos are left to
    /// the crop step. Individual failures are collected in the report and never
    /// stop the traversal; only an unusable source or destination root is an
    /// error.
    pub async fn execute(&self, source_root: &Path, dest_root: &Path) -> Result<MirrorReport, DomainError> {
        info!(
            source = %source_root.display(),
            dest = %dest_root.display(),
            "Mirroring directory tree"
        );

        if !self.fs_port.directory_exists(source_root).await? {
            return Err(DomainError::SourceNotFound(source_root.to_path_buf()));
        }
        self.fs_port.create_directory(dest_root).await?;

        let mut report = MirrorReport::default();
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
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| source_root.to_path_buf());
                    warn!(path = %path.display(), error = %e, "Cannot read source entry");
                    report.failures.push(CopyFailure {
                        path,
                        cause: e.to_string(),
                    });
                    continue;
                }
            };

            let relative = match entry.path().strip_prefix(source_root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };
            let target = dest_root.join(&relative);

            if entry.file_type().is_dir() {
                match self.fs_port.create_directory(&target).await {
                    Ok(()) => report.directories.push(relative),
                    Err(e) => {
                        warn!(path = %entry.path().display(), error = %e, "Cannot create mirrored directory");
                        report.failures.push(CopyFailure {
                            path: entry.path().to_path_buf(),
                            cause: e.to_string(),
                        });
                    }
                }
            } else if entry.file_type().is_file() {
                if self.classifier.is_video(entry.path()) {
                    debug!(path = %relative.display(), "Leaving video for the crop step");
                    continue;
                }
                match self.fs_port.copy_file(entry.path(), &target).await {
                    Ok(()) => {
                        debug!(path = %relative.display(), "Copied");
                        report.copied.push(relative);
                    }
                    Err(e) => {
                        warn!(path = %entry.path().display(), error = %e, "Copy failed, continuing");
                        report.failures.push(CopyFailure {
                            path: entry.path().to_path_buf(),
                            cause: match e {
                                DomainError::CopyFailure { cause, .. } => cause,
                                other => other.to_string(),
                            },
                        });
                    }
                }
            }
        }

        info!(
            directories = report.directories.len(),
            copied = report.copied.len(),
            failures = report.failures.len(),
            "Mirroring finished"
        );
        Ok(report)
    }
}
