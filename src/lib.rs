//! CropMirror library
//!
//! Mirrors a directory tree into a destination and re-encodes every video,
//! cropped to a region of interest chosen and confirmed by an operator. A
//! verification pass then checks that every expected output exists and opens.
//!
//! The crate follows a ports and adapters layout: `domain` holds the types and
//! rules, `ports` the collaborator traits, `adapters` their implementations and
//! `app` the use case interactors wired together by `app::container`.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    BatchReport, OutputFormat, PipelineReport, Rectangle, RoiDecision, VerificationResult,
    VideoEntry,
};
pub use error::{CropMirrorError, CropMirrorResult};
