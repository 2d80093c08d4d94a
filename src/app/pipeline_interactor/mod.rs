// Pipeline interactor - Mirror, crop and verify in sequence

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::crop_interactor::CropInteractor;
use crate::app::mirror_interactor::MirrorInteractor;
use crate::app::verify_interactor::VerifyInteractor;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::utils::path::PathUtils;

/// Interactor for the full batch use case
pub struct PipelineInteractor {
    mirror: Arc<MirrorInteractor>,
    crop: Arc<CropInteractor>,
    verify: Arc<VerifyInteractor>,
}

impl PipelineInteractor {
    pub fn new(
        mirror: Arc<MirrorInteractor>,
        crop: Arc<CropInteractor>,
        verify: Arc<VerifyInteractor>,
    ) -> Self {
        Self {
            mirror,
            crop,
            verify,
        }
    }

    /// Mirror the tree, crop every accepted video, then check the result
    ///
    /// The phases never overlap. Skipped videos are excluded from the
    /// presence check.
    pub async fn execute(
        &self,
        source_root: &Path,
        dest_root: &Path,
        format: OutputFormat,
    ) -> Result<PipelineReport, DomainError> {
        PathUtils::validate_roots(source_root, dest_root)?;

        let mirror = self.mirror.execute(source_root, dest_root).await?;
        let batch = self.crop.execute(source_root, dest_root, format).await?;

        let skipped = batch.skipped_paths();
        let missing_files = self
            .verify
            .presence_check(source_root, dest_root, format, &skipped)
            .await?;
        let unplayable_files = self.verify.playability_check(dest_root)?;

        let report = PipelineReport {
            source_root: source_root.to_path_buf(),
            dest_root: dest_root.to_path_buf(),
            format,
            mirror,
            batch,
            verification: VerificationResult {
                missing_files,
                unplayable_files,
            },
        };

        if report.is_clean() {
            info!(encoded = report.batch.encoded_count(), "Pipeline finished cleanly");
        } else {
            warn!(
                copy_failures = report.mirror.failures.len(),
                encode_failures = report.batch.failures().count(),
                missing = report.verification.missing_files.len(),
                unplayable = report.verification.unplayable_files.len(),
                "Pipeline finished with problems"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fs_local::LocalFsAdapter;
    use crate::adapters::mock::*;
    use crate::app::roi_interactor::RoiInteractor;
    use crate::domain::rules::*;
    use crate::ports::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn pipeline(picks: Vec<Option<RawSelection>>, answers: Vec<bool>, encoder: MockEncoder) -> PipelineInteractor {
        let fs_port: Arc<dyn FsPort> = Arc::new(LocalFsAdapter);
        let source: Arc<dyn VideoSourcePort> = Arc::new(MockVideoSource::new());
        let classifier = VideoClassifier::default();

        let roi = Arc::new(RoiInteractor::new(
            Arc::clone(&source),
            Arc::new(ScriptedPicker::new(picks)),
            Arc::new(ScriptedPreview::with_fallback([], PreviewEvent::Cancel)),
            Arc::new(ScriptedPrompt::new(answers)),
            PreviewGeometry::default(),
            RetryPolicy::unbounded(),
        ));
        PipelineInteractor::new(
            Arc::new(MirrorInteractor::new(Arc::clone(&fs_port), classifier.clone())),
            Arc::new(CropInteractor::new(
                roi,
                Arc::new(encoder),
                Arc::clone(&fs_port),
                classifier.clone(),
            )),
            Arc::new(VerifyInteractor::new(source, fs_port, classifier)),
        )
    }

    #[tokio::test]
    async fn test_encode_failure_surfaces_in_report() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write_mock_video(&src.path().join("a.avi"), 64, 64, 3).unwrap();
        write_mock_video(&src.path().join("b.avi"), 64, 64, 3).unwrap();

        let report = pipeline(
            vec![
                Some(RawSelection::new(0, 0, 8, 8)),
                Some(RawSelection::new(0, 0, 8, 8)),
            ],
            vec![true, true],
            MockEncoder::new().failing_for("b.avi"),
        )
        .execute(src.path(), dst.path(), OutputFormat::Mp4)
        .await
        .unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.batch.encoded_count(), 1);
        assert_eq!(
            report.verification.missing_files.into_iter().collect::<Vec<_>>(),
            vec![PathBuf::from("b_cropped.mp4")]
        );
    }

    #[tokio::test]
    async fn test_corrupt_output_flagged_unplayable() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write_mock_video(&src.path().join("a.avi"), 64, 64, 3).unwrap();

        let report = pipeline(
            vec![Some(RawSelection::new(0, 0, 8, 8))],
            vec![true],
            MockEncoder::new().corrupting("a.avi"),
        )
        .execute(src.path(), dst.path(), OutputFormat::Ffv1)
        .await
        .unwrap();

        assert!(report.batch.is_clean());
        assert!(report.verification.missing_files.is_empty());
        assert_eq!(
            report.verification.unplayable_files.into_iter().collect::<Vec<_>>(),
            vec![PathBuf::from("a_cropped.mkv")]
        );
    }

    #[tokio::test]
    async fn test_destination_equal_to_source_rejected() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("notes.txt"), b"n").unwrap();

        let err = pipeline(vec![], vec![], MockEncoder::new())
            .execute(src.path(), src.path(), OutputFormat::Mp4)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadArgs(_)));
    }

    #[tokio::test]
    async fn test_copy_failure_makes_run_unclean() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("notes.txt"), b"n").unwrap();
        fs::create_dir_all(dst.path().join("notes.txt")).unwrap();

        let report = pipeline(vec![], vec![], MockEncoder::new())
            .execute(src.path(), dst.path(), OutputFormat::Mp4)
            .await
            .unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.mirror.failures.len(), 1);
        assert!(report.batch.is_clean());
        assert!(report
            .verification
            .missing_files
            .contains(&PathBuf::from("notes.txt")));
    }

    #[tokio::test]
    async fn test_rerun_into_nested_destination_ignores_previous_outputs() {
        let src = TempDir::new().unwrap();
        let dest = src.path().join("out");
        write_mock_video(&src.path().join("a.avi"), 64, 64, 3).unwrap();
        fs::write(src.path().join("notes.txt"), b"n").unwrap();

        let interactor = pipeline(
            vec![
                Some(RawSelection::new(0, 0, 8, 8)),
                Some(RawSelection::new(0, 0, 16, 16)),
            ],
            vec![true, true],
            MockEncoder::new(),
        );
        for _ in 0..2 {
            let report = interactor
                .execute(src.path(), &dest, OutputFormat::Mp4)
                .await
                .unwrap();
            assert!(report.is_clean(), "{report:#?}");
            assert_eq!(report.batch.videos.len(), 1);
            assert_eq!(report.batch.videos[0].entry.relative_path, PathBuf::from("a.avi"));
            assert_eq!(report.mirror.copied, vec![PathBuf::from("notes.txt")]);
        }

        assert!(dest.join("a_cropped.mp4").is_file());
        assert!(!dest.join("out").exists());
    }
}
