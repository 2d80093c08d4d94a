//! Run report output: JSON files and the end-of-run summary

use std::fmt::Write;

use crate::domain::model::{PipelineReport, VerificationResult, VideoOutcome};

pub mod writer;

/// Human-readable end-of-run summary
pub fn render_summary(report: &PipelineReport) -> String {
    let mut out = String::new();
    let batch = &report.batch;

    let _ = writeln!(
        out,
        "{} -> {} ({})",
        report.source_root.display(),
        report.dest_root.display(),
        report.format
    );
    let _ = writeln!(
        out,
        "Mirrored {} directories and {} files",
        report.mirror.directories.len(),
        report.mirror.copied.len()
    );
    for failure in &report.mirror.failures {
        let _ = writeln!(out, "  copy failed: {}: {}", failure.path.display(), failure.cause);
    }

    let _ = writeln!(
        out,
        "Videos: {} encoded, {} skipped, {} failed",
        batch.encoded_count(),
        batch.skipped_paths().len(),
        batch.failures().count()
    );
    for video in &batch.videos {
        let line = match &video.outcome {
            VideoOutcome::Encoded { roi, output } => {
                format!("encoded  {} [{}] -> {}", video.entry.relative_path.display(), roi, output.display())
            }
            VideoOutcome::Skipped => format!("skipped  {}", video.entry.relative_path.display()),
            VideoOutcome::EncodeFailed { roi, error } => {
                format!("FAILED   {} [{}]: {}", video.entry.relative_path.display(), roi, error)
            }
            VideoOutcome::Rejected { error } => {
                format!("REJECTED {}: {}", video.entry.relative_path.display(), error)
            }
        };
        let _ = writeln!(out, "  {}", line);
    }

    out.push_str(&render_verification(&report.verification));
    out
}

/// Human-readable verification findings
pub fn render_verification(result: &VerificationResult) -> String {
    let mut out = String::new();
    if result.is_clean() {
        let _ = writeln!(out, "Verification passed");
        return out;
    }
    let _ = writeln!(
        out,
        "Verification: {} missing, {} unplayable",
        result.missing_files.len(),
        result.unplayable_files.len()
    );
    for path in &result.missing_files {
        let _ = writeln!(out, "  missing:    {}", path.display());
    }
    for path in &result.unplayable_files {
        let _ = writeln!(out, "  unplayable: {}", path.display());
    }
    out
}
