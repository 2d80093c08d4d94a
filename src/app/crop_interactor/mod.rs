// Crop interactor - Collects ROI decisions for a batch, then encodes

use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::app::roi_interactor::RoiInteractor;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// Interactor for the batch crop use case
pub struct CropInteractor {
    roi_interactor: Arc<RoiInteractor>,
    encoder: Arc<dyn EncoderPort>,
    fs_port: Arc<dyn FsPort>,
    classifier: VideoClassifier,
}

impl CropInteractor {
    /// Create new crop interactor with injected ports
    pub fn new(
        roi_interactor: Arc<RoiInteractor>,
        encoder: Arc<dyn EncoderPort>,
        fs_port: Arc<dyn FsPort>,
        classifier: VideoClassifier,
    ) -> Self {
        Self {
            roi_interactor,
            encoder,
            fs_port,
            classifier,
        }
    }

    /// Every video under `source_root`, in sorted traversal order
    ///
    /// A destination nested inside the source is not walked.
    pub fn discover(&self, source_root: &Path, dest_root: &Path) -> Result<Vec<VideoEntry>, DomainError> {
        if !source_root.is_dir() {
            return Err(DomainError::SourceNotFound(source_root.to_path_buf()));
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(source_root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !PathUtils::is_within(entry.path(), dest_root));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry during discovery");
                    continue;
                }
            };
            if entry.file_type().is_file() && self.classifier.is_video(entry.path()) {
                entries.push(VideoEntry::new(source_root, entry.path())?);
            }
        }
        Ok(entries)
    }

    /// Decide every video interactively, then encode the accepted ones
    ///
    /// A failed encode is recorded against its video and the batch moves on.
    /// Videos whose output name collides with another video's are rejected
    /// up front and never shown to the operator.
    pub async fn execute(
        &self,
        source_root: &Path,
        dest_root: &Path,
        format: OutputFormat,
    ) -> Result<BatchReport, DomainError> {
        let entries = self.discover(source_root, dest_root)?;
        let colliding = OutputNaming::colliding_sources(
            entries.iter().map(|entry| entry.relative_path.as_path()),
            format,
        );
        info!(videos = entries.len(), colliding = colliding.len(), %format, "Discovered videos");

        let mut decisions = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if colliding.contains(&entry.relative_path) {
                let output = entry.output_relative_path(format);
                warn!(
                    video = %entry.relative_path.display(),
                    output = %output.display(),
                    "Output name shared with another video"
                );
                let rejection = DomainError::EncodeRejected {
                    path: entry.source_path.clone(),
                    reason: format!("duplicate output name {}", output.display()),
                };
                decisions.push((entry, Err(rejection)));
                continue;
            }

            info!(
                video = %entry.relative_path.display(),
                index = index + 1,
                "Selecting ROI"
            );
            let decision = self.roi_interactor.select(&entry).await?;
            decisions.push((entry, Ok(decision)));
        }

        let mut report = BatchReport::default();
        for (entry, decision) in decisions {
            let outcome = match decision {
                Err(error) => VideoOutcome::Rejected { error },
                Ok(RoiDecision::Skipped) => VideoOutcome::Skipped,
                Ok(RoiDecision::Accepted(roi)) => match self.encode_one(&entry, roi, dest_root, format).await {
                    Ok(output) => VideoOutcome::Encoded { roi, output },
                    Err(e) => {
                        error!(video = %entry.relative_path.display(), error = %e, "Encoding failed");
                        VideoOutcome::EncodeFailed { roi, error: e }
                    }
                },
            };
            report.videos.push(VideoReport { entry, outcome });
        }

        info!(
            encoded = report.encoded_count(),
            skipped = report.skipped_paths().len(),
            failed = report.failures().count(),
            "Batch finished"
        );
        Ok(report)
    }

    async fn encode_one(
        &self,
        entry: &VideoEntry,
        roi: Rectangle,
        dest_root: &Path,
        format: OutputFormat,
    ) -> Result<std::path::PathBuf, DomainError> {
        self.fs_port
            .create_directory(&dest_root.join(entry.relative_dir()))
            .await?;

        let request = EncodeRequest {
            input: entry.source_path.clone(),
            rectangle: roi,
            output: dest_root.join(entry.output_relative_path(format)),
            format,
        };
        let report = self.encoder.encode(&request).await?;
        Ok(report.output)
    }
}
