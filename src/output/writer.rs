//! Report file writer and reader

use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::model::PipelineReport;
use crate::error::{CropMirrorError, CropMirrorResult};

/// Writes reports atomically: a temporary file beside the target, then a rename
pub struct ReportWriter;

impl ReportWriter {
    /// Serialize `value` as pretty JSON to `path`
    pub fn write_json<T: Serialize>(path: &Path, value: &T) -> CropMirrorResult<()> {
        let report_file = |source: std::io::Error| CropMirrorError::ReportFile {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(report_file)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(report_file)?;
        serde_json::to_writer_pretty(&mut temp, value)?;
        temp.write_all(b"\n").map_err(report_file)?;
        temp.persist(path).map_err(|e| report_file(e.error))?;

        info!(path = %path.display(), "Report written");
        Ok(())
    }

    /// Read a pipeline report written by an earlier run
    pub fn read_pipeline_report(path: &Path) -> CropMirrorResult<PipelineReport> {
        let content = std::fs::read_to_string(path).map_err(|source| CropMirrorError::ReportFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Relative paths of the videos skipped in an earlier run
    pub fn read_skipped(path: &Path) -> CropMirrorResult<BTreeSet<PathBuf>> {
        Ok(Self::read_pipeline_report(path)?.batch.skipped_paths())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::*;
    use tempfile::TempDir;

    #[test]
    fn test_skipped_paths_survive_a_report_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/run.json");
        let report = PipelineReport {
            source_root: PathBuf::from("/src"),
            dest_root: PathBuf::from("/dst"),
            format: OutputFormat::Libx264Avi,
            mirror: MirrorReport::default(),
            batch: BatchReport {
                videos: vec![VideoReport {
                    entry: VideoEntry {
                        source_path: PathBuf::from("/src/exp1/b.avi"),
                        relative_path: PathBuf::from("exp1/b.avi"),
                    },
                    outcome: VideoOutcome::Skipped,
                }],
            },
            verification: VerificationResult::default(),
        };

        ReportWriter::write_json(&path, &report).unwrap();
        assert_eq!(ReportWriter::read_pipeline_report(&path).unwrap(), report);
        assert_eq!(
            ReportWriter::read_skipped(&path).unwrap(),
            BTreeSet::from([PathBuf::from("exp1/b.avi")])
        );
    }

    #[test]
    fn test_unreadable_report_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");
        let err = ReportWriter::read_skipped(&path).unwrap_err();
        assert!(err.to_string().contains("missing.json"));

        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            ReportWriter::read_skipped(&path),
            Err(CropMirrorError::Json(_))
        ));
    }
}
