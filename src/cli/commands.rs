//! Command implementations

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::app::container::AppContainer;
use crate::cli::args::{MirrorArgs, RunArgs, VerifyArgs};
use crate::output::writer::ReportWriter;
use crate::output::{render_summary, render_verification};
use crate::utils::path::PathUtils;

/// Execute the run command; returns whether the run was clean
pub async fn run(container: &dyn AppContainer, args: RunArgs) -> Result<bool> {
    info!(
        source = %args.source.display(),
        dest = %args.dest.display(),
        format = %args.format,
        "Starting run"
    );

    let report = container
        .pipeline_interactor()
        .execute(&args.source, &args.dest, args.format)
        .await
        .context("Run aborted")?;

    print!("{}", render_summary(&report));
    if let Some(path) = &args.report {
        ReportWriter::write_json(path, &report)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    Ok(report.is_clean())
}

/// Execute the mirror command
pub async fn mirror(container: &dyn AppContainer, args: MirrorArgs) -> Result<bool> {
    PathUtils::validate_roots(&args.source, &args.dest)?;

    let report = container
        .mirror_interactor()
        .execute(&args.source, &args.dest)
        .await
        .context("Mirroring aborted")?;

    println!(
        "Mirrored {} directories and {} files",
        report.directories.len(),
        report.copied.len()
    );
    for failure in &report.failures {
        println!("  copy failed: {}: {}", failure.path.display(), failure.cause);
    }
    Ok(report.is_clean())
}

/// Execute the verify command
pub async fn verify(container: &dyn AppContainer, args: VerifyArgs) -> Result<bool> {
    let skipped = match &args.report {
        Some(path) => ReportWriter::read_skipped(path)
            .with_context(|| format!("Failed to load report {}", path.display()))?,
        None => {
            warn!("No report given, every source video is expected to have an output");
            BTreeSet::new()
        }
    };

    let result = container
        .verify_interactor()
        .execute(&args.source, &args.dest, args.format, &skipped)
        .await
        .context("Verification aborted")?;

    print!("{}", render_verification(&result));
    Ok(result.is_clean())
}
