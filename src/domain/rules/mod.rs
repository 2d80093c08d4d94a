// Domain rules - Business logic and policies

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::domain::errors::*;
use crate::domain::model::*;

#[cfg(test)]
mod tests;

/// Extensions treated as video when no configuration says otherwise
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["avi", "mp4", "mkv", "mov"];

/// Suffix appended to the stem of every cropped output
pub const CROPPED_SUFFIX: &str = "_cropped";

/// Decides which files are videos
#[derive(Debug, Clone, PartialEq)]
pub struct VideoClassifier {
    extensions: BTreeSet<String>,
}

impl VideoClassifier {
    /// Build a classifier from extensions (leading dots and case are ignored)
    pub fn new<I, S>(extensions: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: BTreeSet<String> = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        if extensions.is_empty() {
            return Err(DomainError::Config(
                "at least one video extension is required".to_string(),
            ));
        }

        Ok(Self { extensions })
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Whether `path` names a video by its extension
    pub fn is_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for VideoClassifier {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// Naming of cropped outputs
pub struct OutputNaming;

impl OutputNaming {
    /// `name.ext` becomes `name_cropped.<format extension>`
    pub fn cropped_file_name(source_file: &Path, format: OutputFormat) -> OsString {
        let mut name = source_file
            .file_stem()
            .map(|stem| stem.to_os_string())
            .unwrap_or_default();
        name.push(CROPPED_SUFFIX);
        name.push(".");
        name.push(format.extension());
        name
    }

    /// Cropped output for a source path relative to the batch root
    pub fn cropped_relative_path(relative_source: &Path, format: OutputFormat) -> PathBuf {
        let name = Self::cropped_file_name(relative_source, format);
        match relative_source.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Sources whose cropped output would land on the same path as another source
    ///
    /// `a.avi` and `a.mov` in one directory both name `a_cropped.<ext>`.
    pub fn colliding_sources<'a>(
        relative_sources: impl IntoIterator<Item = &'a Path>,
        format: OutputFormat,
    ) -> BTreeSet<PathBuf> {
        let mut by_output: BTreeMap<PathBuf, Vec<&Path>> = BTreeMap::new();
        for source in relative_sources {
            by_output
                .entry(Self::cropped_relative_path(source, format))
                .or_default()
                .push(source);
        }
        by_output
            .into_values()
            .filter(|sources| sources.len() > 1)
            .flatten()
            .map(Path::to_path_buf)
            .collect()
    }
}

/// Geometry of the confirmation preview window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewGeometry {
    pub min_width: u32,
    pub min_height: u32,
}

impl PreviewGeometry {
    pub const DEFAULT_MIN_WIDTH: u32 = 400;
    pub const DEFAULT_MIN_HEIGHT: u32 = 80;
    /// Neutral border colour
    pub const BORDER: [u8; 3] = [0, 0, 0];

    pub fn new(min_width: u32, min_height: u32) -> Result<Self, DomainError> {
        if min_width == 0 || min_height == 0 {
            return Err(DomainError::Config(format!(
                "preview minimum size must be positive (got {}x{})",
                min_width, min_height
            )));
        }
        Ok(Self {
            min_width,
            min_height,
        })
    }

    /// Padding before and after `size` needed to reach `min`; the odd pixel goes after
    pub fn split_padding(size: u32, min: u32) -> (u32, u32) {
        if size >= min {
            return (0, 0);
        }
        let total = min - size;
        let before = total / 2;
        (before, total - before)
    }

    /// Crop a decoded frame to the ROI and pad it to the minimum display size
    pub fn display_frame(&self, frame: &Frame, roi: &Rectangle) -> Frame {
        frame
            .crop(roi)
            .pad_to_min(self.min_width, self.min_height, Self::BORDER)
    }
}

impl Default for PreviewGeometry {
    fn default() -> Self {
        Self {
            min_width: Self::DEFAULT_MIN_WIDTH,
            min_height: Self::DEFAULT_MIN_HEIGHT,
        }
    }
}

/// Cap on rectangle acquisitions per video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    pub fn limited(max_attempts: u32) -> Result<Self, DomainError> {
        if max_attempts == 0 {
            return Err(DomainError::Config(
                "roi.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_attempts: Some(max_attempts),
        })
    }

    /// Whether another acquisition may start after `attempts` have been made
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }
}
