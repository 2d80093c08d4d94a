//! CLI module for CropMirror
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

pub use args::{MirrorArgs, RunArgs, VerifyArgs};

/// CropMirror
///
/// Mirrors a directory tree and re-encodes every video in it, cropped to a
/// region the operator picks and confirms for each video.
#[derive(Parser, Debug)]
#[command(name = "cropmirror")]
#[command(about = "Mirror a directory tree, cropping every video to an operator-chosen region")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Configuration file (default: ./cropmirror.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mirror the tree, crop every video interactively, then verify
    Run(RunArgs),
    /// Mirror directories and non-video files only
    Mirror(MirrorArgs),
    /// Check an existing output tree for missing and unplayable files
    Verify(VerifyArgs),
}
