// Domain models - Core types and data structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::domain::errors::DomainError;
use crate::domain::rules::{OutputNaming, PreviewGeometry};


/// Crop region in source-frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    /// Create a rectangle, rejecting empty regions
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self, DomainError> {
        let rect = Self {
            x,
            y,
            width,
            height,
        };
        rect.validate()?;
        Ok(rect)
    }

    /// Width and height are both positive
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Validate dimensions
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DomainError::InvalidRoi(format!(
                "width and height must be greater than 0 (got {}x{})",
                self.width, self.height
            )))
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Transcoder crop filter (`crop=w:h:x:y`)
    pub fn crop_filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Selection as reported by a picker, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSelection {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl RawSelection {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Parse `x,y,w,h` (commas and/or whitespace as separators)
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();

        if parts.len() != 4 {
            return Err(DomainError::InvalidRoi(format!(
                "expected four integers x,y,w,h but got '{}'",
                input.trim()
            )));
        }

        let mut values = [0i64; 4];
        for (slot, part) in values.iter_mut().zip(parts.iter()) {
            *slot = part.parse::<i64>().map_err(|_| {
                DomainError::InvalidRoi(format!("'{}' is not an integer", part))
            })?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}

impl TryFrom<RawSelection> for Rectangle {
    type Error = DomainError;

    fn try_from(raw: RawSelection) -> Result<Self, Self::Error> {
        let component = |name: &str, value: i64| {
            u32::try_from(value).map_err(|_| {
                DomainError::InvalidRoi(format!("{} must be a non-negative integer, got {}", name, value))
            })
        };

        Rectangle::new(
            component("x", raw.x)?,
            component("y", raw.y)?,
            component("width", raw.width)?,
            component("height", raw.height)?,
        )
    }
}

/// A discovered video and its path relative to the batch root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
}

impl VideoEntry {
    /// Build an entry for `source_path`, which must live under `source_root`
    pub fn new(source_root: &Path, source_path: &Path) -> Result<Self, DomainError> {
        let relative_path = source_path
            .strip_prefix(source_root)
            .map_err(|_| {
                DomainError::BadArgs(format!(
                    "{} is not inside {}",
                    source_path.display(),
                    source_root.display()
                ))
            })?
            .to_path_buf();

        Ok(Self {
            source_path: source_path.to_path_buf(),
            relative_path,
        })
    }

    /// Directory of the video relative to the batch root
    pub fn relative_dir(&self) -> &Path {
        self.relative_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Relative path of the cropped output for `format`
    pub fn output_relative_path(&self, format: OutputFormat) -> PathBuf {
        OutputNaming::cropped_relative_path(&self.relative_path, format)
    }
}

/// Outcome of ROI selection for one video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoiDecision {
    Accepted(Rectangle),
    Skipped,
}

/// Logical codec choice and its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Lossless intra codec in Matroska
    Ffv1,
    /// Lossless H.264 in MP4
    Mp4,
    /// Lossless H.264 in AVI
    Libx264Avi,
}

impl OutputFormat {
    /// Parse format choice from string
    pub fn parse(format_str: &str) -> Result<Self, DomainError> {
        match format_str.trim().to_lowercase().as_str() {
            "ffv1" => Ok(OutputFormat::Ffv1),
            "mp4" => Ok(OutputFormat::Mp4),
            "libx264_avi" | "libx264" => Ok(OutputFormat::Libx264Avi),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid output format: {}. Valid formats: ffv1, mp4, libx264_avi",
                format_str
            ))),
        }
    }

    /// File extension of the produced container
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Ffv1 => "mkv",
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Libx264Avi => "avi",
        }
    }

    /// Container name passed to the transcoder (`-f`)
    pub fn container(&self) -> &'static str {
        match self {
            OutputFormat::Ffv1 => "matroska",
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Libx264Avi => "avi",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Ffv1 => "ffv1",
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Libx264Avi => "libx264_avi",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// RGB24 raster buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub const CHANNELS: usize = 3;

    /// Wrap packed RGB24 bytes
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, DomainError> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if data.len() != expected {
            return Err(DomainError::InternalError(format!(
                "frame buffer holds {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame of a single colour
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * Self::CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        Some([self.data[offset], self.data[offset + 1], self.data[offset + 2]])
    }

    fn row_stride(&self) -> usize {
        self.width as usize * Self::CHANNELS
    }

    /// Region of the frame inside `rect`, clamped to the frame bounds
    pub fn crop(&self, rect: &Rectangle) -> Frame {
        let x0 = (rect.x as u64).min(self.width as u64) as usize;
        let y0 = (rect.y as u64).min(self.height as u64) as usize;
        let x1 = rect.right().min(self.width as u64) as usize;
        let y1 = rect.bottom().min(self.height as u64) as usize;

        let width = x1 - x0;
        let height = y1 - y0;
        let stride = self.row_stride();
        let mut data = Vec::with_capacity(width * height * Self::CHANNELS);
        for row in y0..y1 {
            let start = row * stride + x0 * Self::CHANNELS;
            data.extend_from_slice(&self.data[start..start + width * Self::CHANNELS]);
        }

        Frame {
            width: width as u32,
            height: height as u32,
            data,
        }
    }

    /// Centre the frame on a `fill` border so it is at least `min_width` x `min_height`
    pub fn pad_to_min(&self, min_width: u32, min_height: u32, fill: [u8; 3]) -> Frame {
        let (left, right) = PreviewGeometry::split_padding(self.width, min_width);
        let (top, bottom) = PreviewGeometry::split_padding(self.height, min_height);
        if left + right + top + bottom == 0 {
            return self.clone();
        }

        let mut padded = Frame::filled(self.width + left + right, self.height + top + bottom, fill);
        let src_stride = self.row_stride();
        let dst_stride = padded.row_stride();
        for row in 0..self.height as usize {
            let src = row * src_stride;
            let dst = (row + top as usize) * dst_stride + left as usize * Self::CHANNELS;
            padded.data[dst..dst + src_stride].copy_from_slice(&self.data[src..src + src_stride]);
        }
        padded
    }
}

/// Operator input for one displayed preview frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewEvent {
    /// Advance playback by one frame
    Next,
    /// Scrubber moved to the given frame index
    Seek(u64),
    /// Cancel key pressed
    Cancel,
}

/// A non-video file that could not be mirrored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyFailure {
    pub path: PathBuf,
    pub cause: String,
}

/// Result of mirroring a tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorReport {
    /// Directories created or confirmed at the destination (relative)
    pub directories: Vec<PathBuf>,
    /// Non-video files copied (relative)
    pub copied: Vec<PathBuf>,
    pub failures: Vec<CopyFailure>,
}

impl MirrorReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Terminal state of one discovered video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoOutcome {
    Encoded { roi: Rectangle, output: PathBuf },
    Skipped,
    EncodeFailed { roi: Rectangle, error: DomainError },
    /// Never offered to the operator, e.g. its output name is taken by another video
    Rejected { error: DomainError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoReport {
    pub entry: VideoEntry,
    pub outcome: VideoOutcome,
}

/// Per-video outcomes of a crop run, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub videos: Vec<VideoReport>,
}

impl BatchReport {
    /// Relative paths of videos the operator skipped
    pub fn skipped_paths(&self) -> BTreeSet<PathBuf> {
        self.videos
            .iter()
            .filter(|video| matches!(video.outcome, VideoOutcome::Skipped))
            .map(|video| video.entry.relative_path.clone())
            .collect()
    }

    pub fn encoded_count(&self) -> usize {
        self.videos
            .iter()
            .filter(|video| matches!(video.outcome, VideoOutcome::Encoded { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &VideoReport> {
        self.videos
            .iter()
            .filter(|video| {
                matches!(
                    video.outcome,
                    VideoOutcome::EncodeFailed { .. } | VideoOutcome::Rejected { .. }
                )
            })
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Findings of the presence and playability checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Expected artifacts absent from the destination (relative)
    pub missing_files: BTreeSet<PathBuf>,
    /// Output videos that failed to open (relative)
    pub unplayable_files: BTreeSet<PathBuf>,
}

impl VerificationResult {
    pub fn is_clean(&self) -> bool {
        self.missing_files.is_empty() && self.unplayable_files.is_empty()
    }
}

/// Combined result of a full pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    pub format: OutputFormat,
    pub mirror: MirrorReport,
    pub batch: BatchReport,
    pub verification: VerificationResult,
}

impl PipelineReport {
    pub fn is_clean(&self) -> bool {
        self.mirror.is_clean() && self.batch.is_clean() && self.verification.is_clean()
    }
}
