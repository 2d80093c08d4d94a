// ROI interactor - Operator-driven selection and confirmation of a crop region

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

pub const SKIP_QUESTION: &str = "ROI is None or invalid. Do you want to skip this video?";
pub const CONFIRM_QUESTION: &str = "Is the ROI correct?";

/// Selection state of one video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiState {
    NeedRoi,
    Invalid,
    AwaitConfirmation(Rectangle),
    Accepted(Rectangle),
    Skipped,
}

/// Interactor for the ROI selection use case
pub struct RoiInteractor {
    video_source: Arc<dyn VideoSourcePort>,
    picker: Arc<dyn RoiPickerPort>,
    preview: Arc<dyn PreviewPort>,
    prompt: Arc<dyn PromptPort>,
    geometry: PreviewGeometry,
    retry_policy: RetryPolicy,
}

impl RoiInteractor {
    /// Create new ROI interactor with injected ports
    pub fn new(
        video_source: Arc<dyn VideoSourcePort>,
        picker: Arc<dyn RoiPickerPort>,
        preview: Arc<dyn PreviewPort>,
        prompt: Arc<dyn PromptPort>,
        geometry: PreviewGeometry,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            video_source,
            picker,
            preview,
            prompt,
            geometry,
            retry_policy,
        }
    }

    /// Run the selection state machine until the video is accepted or skipped
    ///
    /// Decode problems and unusable selections lead to the skip question, never
    /// to an error. Errors are reserved for a broken operator console.
    pub async fn select(&self, entry: &VideoEntry) -> Result<RoiDecision, DomainError> {
        let title = entry.relative_path.display().to_string();
        let mut attempts: u32 = 0;
        let mut state = RoiState::NeedRoi;

        loop {
            state = match state {
                RoiState::NeedRoi => {
                    if !self.retry_policy.allows(attempts) {
                        warn!(
                            video = %title,
                            attempts,
                            "No acceptable ROI within the attempt limit, skipping"
                        );
                        RoiState::Skipped
                    } else {
                        attempts += 1;
                        match self.acquire(&entry.source_path, &title).await? {
                            Some(rect) => RoiState::AwaitConfirmation(rect),
                            None => RoiState::Invalid,
                        }
                    }
                }
                RoiState::Invalid => {
                    if self.prompt.ask(&title, SKIP_QUESTION).await? {
                        RoiState::Skipped
                    } else {
                        RoiState::NeedRoi
                    }
                }
                RoiState::AwaitConfirmation(rect) => {
                    self.play_back(&entry.source_path, &title, &rect).await?;
                    if self.prompt.ask(&title, CONFIRM_QUESTION).await? {
                        RoiState::Accepted(rect)
                    } else {
                        debug!(video = %title, roi = %rect, "ROI rejected by operator");
                        RoiState::NeedRoi
                    }
                }
                RoiState::Accepted(rect) => {
                    info!(video = %title, roi = %rect, attempts, "ROI accepted");
                    return Ok(RoiDecision::Accepted(rect));
                }
                RoiState::Skipped => {
                    info!(video = %title, attempts, "Video skipped");
                    return Ok(RoiDecision::Skipped);
                }
            };
        }
    }

    /// Ask the operator for a rectangle on the first decodable frame
    ///
    /// `None` covers an unopenable video, no selection and a selection failing
    /// the validity predicate.
    async fn acquire(&self, path: &Path, title: &str) -> Result<Option<Rectangle>, DomainError> {
        let frame = match self.first_frame(path) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "No frame to select on");
                return Ok(None);
            }
        };

        let selection = match self.picker.pick(title, &frame).await? {
            Some(selection) => selection,
            None => {
                debug!(video = %title, "No rectangle selected");
                return Ok(None);
            }
        };

        match Rectangle::try_from(selection) {
            Ok(rect) => Ok(Some(rect)),
            Err(e) => {
                warn!(video = %title, ?selection, error = %e, "Rejected selection");
                Ok(None)
            }
        }
    }

    fn first_frame(&self, path: &Path) -> Result<Frame, DomainError> {
        let mut handle = self.video_source.open(path)?;
        let result = read_first_decodable(handle.as_mut(), path);
        handle.close();
        result
    }

    /// Play the video cropped to `rect` until it ends or the operator cancels
    async fn play_back(&self, path: &Path, title: &str, rect: &Rectangle) -> Result<(), DomainError> {
        let mut handle = match self.video_source.open(path) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot open video for preview");
                return Ok(());
            }
        };

        let frame_count = handle.frame_count();
        self.preview.open(title, frame_count).await?;
        let result = self.preview_loop(handle.as_mut(), path, rect, frame_count).await;
        handle.close();
        self.preview.close().await?;
        result
    }

    async fn preview_loop(
        &self,
        handle: &mut dyn VideoHandle,
        path: &Path,
        rect: &Rectangle,
        frame_count: u64,
    ) -> Result<(), DomainError> {
        let mut position: u64 = 0;
        if let Err(e) = handle.seek(position) {
            warn!(path = %path.display(), error = %e, "Preview seek failed");
            return Ok(());
        }

        loop {
            let frame = match handle.read_next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    warn!(path = %path.display(), position, error = %e, "Preview decode failed");
                    break;
                }
            };

            let shown = self.geometry.display_frame(&frame, rect);
            match self.preview.show(&shown, position).await? {
                PreviewEvent::Next => position += 1,
                PreviewEvent::Seek(target) => {
                    position = target.min(frame_count);
                    if let Err(e) = handle.seek(position) {
                        warn!(path = %path.display(), position, error = %e, "Preview seek failed");
                        break;
                    }
                }
                PreviewEvent::Cancel => {
                    debug!(path = %path.display(), position, "Preview cancelled");
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Read frames from the start until one decodes
///
/// A frame that fails to decode is passed over; the scan gives up once as many
/// failures as the reported frame count (at least one) have been seen.
pub fn read_first_decodable(handle: &mut dyn VideoHandle, path: &Path) -> Result<Frame, DomainError> {
    handle.seek(0)?;
    let budget = handle.frame_count().max(1);
    let mut failures: u64 = 0;

    loop {
        match handle.read_next_frame() {
            Ok(Some(frame)) if !frame.is_empty() => return Ok(frame),
            Ok(Some(_)) => failures += 1,
            Ok(None) => {
                return Err(DomainError::DecodeFailure {
                    path: path.to_path_buf(),
                    message: "no decodable frame".to_string(),
                })
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Frame failed to decode");
                failures += 1;
                if failures >= budget {
                    return Err(e);
                }
                continue;
            }
        }
        if failures >= budget {
            return Err(DomainError::DecodeFailure {
                path: path.to_path_buf(),
                message: "no decodable frame".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests;
