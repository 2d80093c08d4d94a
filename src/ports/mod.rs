// Ports - Interface definitions (contracts)

use crate::domain::errors::*;
use crate::domain::model::*;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// An opened video, positioned at a frame index
///
/// Handles are driven from a single thread and are not required to be `Send`.
pub trait VideoHandle {
    /// Number of frames reported by the container
    fn frame_count(&self) -> u64;

    /// Position the next read at `frame_index`
    fn seek(&mut self, frame_index: u64) -> Result<(), DomainError>;

    /// Decode the next frame, `None` at end of stream
    fn read_next_frame(&mut self) -> Result<Option<Frame>, DomainError>;

    /// Release decoder resources
    fn close(&mut self) {}
}

/// Port for opening and decoding videos
pub trait VideoSourcePort: Send + Sync {
    /// Open a video for frame access
    fn open(&self, path: &Path) -> Result<Box<dyn VideoHandle>, DomainError>;

    /// Check that a video opens and initializes
    fn is_playable(&self, path: &Path) -> bool {
        match self.open(path) {
            Ok(mut handle) => {
                handle.close();
                true
            }
            Err(_) => false,
        }
    }
}

/// Port for the interactive rectangle picker
#[async_trait]
pub trait RoiPickerPort: Send + Sync {
    /// Let the operator draw a rectangle on `frame`; `None` when nothing was selected
    async fn pick(&self, title: &str, frame: &Frame) -> Result<Option<RawSelection>, DomainError>;
}

/// Port for the playback/preview window
#[async_trait]
pub trait PreviewPort: Send + Sync {
    /// Open the window with a scrubber bounded to `[0, frame_count]`
    async fn open(&self, title: &str, frame_count: u64) -> Result<(), DomainError>;

    /// Display `frame` at scrubber `position` and report what the operator did
    async fn show(&self, frame: &Frame, position: u64) -> Result<PreviewEvent, DomainError>;

    /// Close the window
    async fn close(&self) -> Result<(), DomainError>;
}

/// Port for yes/no questions
#[async_trait]
pub trait PromptPort: Send + Sync {
    async fn ask(&self, title: &str, message: &str) -> Result<bool, DomainError>;
}

/// Everything the transcoder needs for one cropped output
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub rectangle: Rectangle,
    pub output: PathBuf,
    pub format: OutputFormat,
}

impl EncodeRequest {
    /// Checks performed before any transcoder is started
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.input.is_file() {
            return Err(DomainError::SourceNotFound(self.input.clone()));
        }
        self.rectangle
            .validate()
            .map_err(|e| DomainError::EncodeRejected {
                path: self.input.clone(),
                reason: format!("invalid dimensions: {}", e),
            })
    }
}

/// Successful transcoder run
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeReport {
    pub output: PathBuf,
    /// Diagnostic output captured from the transcoder
    pub diagnostics: String,
}

/// Port for the external transcoder
#[async_trait]
pub trait EncoderPort: Send + Sync {
    /// Produce the cropped re-encoded output described by `request`
    async fn encode(&self, request: &EncodeRequest) -> Result<EncodeReport, DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Check if file exists
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError>;

    /// Check if directory exists
    async fn directory_exists(&self, dir_path: &Path) -> Result<bool, DomainError>;

    /// Create directory (including parent directories)
    async fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError>;

    /// Copy file contents, preserving permissions and modification time
    async fn copy_file(&self, from: &Path, to: &Path) -> Result<(), DomainError>;
}
