//! Command-line argument definitions

use clap::Args;
use std::path::PathBuf;

use crate::domain::model::OutputFormat;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source directory tree
    #[arg(short, long)]
    pub source: PathBuf,

    /// Destination directory (created when absent)
    #[arg(short, long)]
    pub dest: PathBuf,

    /// Output format: ffv1 (mkv), mp4, libx264_avi (avi)
    #[arg(short, long, value_parser = OutputFormat::parse)]
    pub format: OutputFormat,

    /// Write the run report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the mirror command
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Source directory tree
    #[arg(short, long)]
    pub source: PathBuf,

    /// Destination directory (created when absent)
    #[arg(short, long)]
    pub dest: PathBuf,
}

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Source directory tree
    #[arg(short, long)]
    pub source: PathBuf,

    /// Output tree to check
    #[arg(short, long)]
    pub dest: PathBuf,

    /// Output format the tree was produced with
    #[arg(short, long, value_parser = OutputFormat::parse)]
    pub format: OutputFormat,

    /// Report of the producing run; videos it lists as skipped are not expected
    #[arg(long)]
    pub report: Option<PathBuf>,
}
