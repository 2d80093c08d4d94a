//! Scripted and in-memory adapters for tests
//!
//! Compiled for unit tests and with the `test-mocks` feature.
//!
//! Mock videos are ordinary files whose content starts with a text header,
//! `MOCKVIDEO <width>x<height> <frames>`. Anything else fails to decode.

use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

pub const MOCK_VIDEO_MAGIC: &str = "MOCKVIDEO";

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Header line of a mock video
pub fn mock_video_header(width: u32, height: u32, frames: u64) -> String {
    format!("{} {}x{} {}\n", MOCK_VIDEO_MAGIC, width, height, frames)
}

/// Write a decodable mock video to `path`
pub fn write_mock_video(path: &Path, width: u32, height: u32, frames: u64) -> std::io::Result<()> {
    fs::write(path, mock_video_header(width, height, frames))
}

/// Colour of mock frame `index`; the red and green channels encode the index
pub fn mock_frame_colour(index: u64) -> [u8; 3] {
    [(index % 256) as u8, ((index / 256) % 256) as u8, 0x40]
}

fn parse_header(path: &Path) -> Result<(u32, u32, u64), DomainError> {
    let decode_failure = |message: &str| DomainError::DecodeFailure {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let bytes = fs::read(path).map_err(|e| decode_failure(&e.to_string()))?;
    let text = String::from_utf8_lossy(&bytes);
    let mut fields = text.split_whitespace();
    if fields.next() != Some(MOCK_VIDEO_MAGIC) {
        return Err(decode_failure("not a video"));
    }

    let (width, height) = fields
        .next()
        .and_then(|dims| dims.split_once('x'))
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
        .filter(|(w, h)| *w > 0 && *h > 0)
        .ok_or_else(|| decode_failure("corrupt header"))?;
    let frames = fields
        .next()
        .and_then(|n| n.parse::<u64>().ok())
        .ok_or_else(|| decode_failure("corrupt header"))?;

    Ok((width, height, frames))
}

/// Decode collaborator over mock video files
#[derive(Debug, Default)]
pub struct MockVideoSource {
    opened: Mutex<Vec<PathBuf>>,
}

impl MockVideoSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path passed to `open`, in call order
    pub fn opened(&self) -> Vec<PathBuf> {
        lock(&self.opened).clone()
    }
}

impl VideoSourcePort for MockVideoSource {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoHandle>, DomainError> {
        lock(&self.opened).push(path.to_path_buf());
        if !path.is_file() {
            return Err(DomainError::SourceNotFound(path.to_path_buf()));
        }
        let (width, height, frame_count) = parse_header(path)?;
        Ok(Box::new(MockVideoHandle {
            width,
            height,
            frame_count,
            position: 0,
        }))
    }
}

struct MockVideoHandle {
    width: u32,
    height: u32,
    frame_count: u64,
    position: u64,
}

impl VideoHandle for MockVideoHandle {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), DomainError> {
        self.position = frame_index;
        Ok(())
    }

    fn read_next_frame(&mut self) -> Result<Option<Frame>, DomainError> {
        if self.position >= self.frame_count {
            return Ok(None);
        }
        let frame = Frame::filled(self.width, self.height, mock_frame_colour(self.position));
        self.position += 1;
        Ok(Some(frame))
    }
}

/// Picker answering from a queue of selections
#[derive(Debug, Default)]
pub struct ScriptedPicker {
    answers: Mutex<VecDeque<Option<RawSelection>>>,
    titles: Mutex<Vec<String>>,
}

impl ScriptedPicker {
    pub fn new(answers: impl IntoIterator<Item = Option<RawSelection>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            titles: Mutex::new(Vec::new()),
        }
    }

    /// Window titles of every pick request
    pub fn titles(&self) -> Vec<String> {
        lock(&self.titles).clone()
    }
}

#[async_trait]
impl RoiPickerPort for ScriptedPicker {
    async fn pick(&self, title: &str, _frame: &Frame) -> Result<Option<RawSelection>, DomainError> {
        lock(&self.titles).push(title.to_string());
        lock(&self.answers)
            .pop_front()
            .ok_or_else(|| DomainError::Ui("picker script exhausted".to_string()))
    }
}

/// Prompt answering from a queue of yes/no answers
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Messages of every question asked
    pub fn questions(&self) -> Vec<String> {
        lock(&self.questions).clone()
    }
}

#[async_trait]
impl PromptPort for ScriptedPrompt {
    async fn ask(&self, _title: &str, message: &str) -> Result<bool, DomainError> {
        lock(&self.questions).push(message.to_string());
        lock(&self.answers)
            .pop_front()
            .ok_or_else(|| DomainError::Ui(format!("prompt script exhausted at '{}'", message)))
    }
}

/// Preview answering from a queue of events, then a fixed fallback
#[derive(Debug)]
pub struct ScriptedPreview {
    events: Mutex<VecDeque<PreviewEvent>>,
    fallback: PreviewEvent,
    shown: Mutex<Vec<(u64, Frame)>>,
    sessions: Mutex<Vec<u64>>,
}

impl ScriptedPreview {
    /// Events are consumed in order; `Next` is used once they run out
    pub fn new(events: impl IntoIterator<Item = PreviewEvent>) -> Self {
        Self::with_fallback(events, PreviewEvent::Next)
    }

    pub fn with_fallback(events: impl IntoIterator<Item = PreviewEvent>, fallback: PreviewEvent) -> Self {
        Self {
            events: Mutex::new(events.into_iter().collect()),
            fallback,
            shown: Mutex::new(Vec::new()),
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Scrubber positions of every shown frame
    pub fn positions(&self) -> Vec<u64> {
        lock(&self.shown).iter().map(|(position, _)| *position).collect()
    }

    /// Every shown frame with its position
    pub fn shown(&self) -> Vec<(u64, Frame)> {
        lock(&self.shown).clone()
    }

    /// Frame counts passed to each `open`
    pub fn sessions(&self) -> Vec<u64> {
        lock(&self.sessions).clone()
    }
}

#[async_trait]
impl PreviewPort for ScriptedPreview {
    async fn open(&self, _title: &str, frame_count: u64) -> Result<(), DomainError> {
        lock(&self.sessions).push(frame_count);
        Ok(())
    }

    async fn show(&self, frame: &Frame, position: u64) -> Result<PreviewEvent, DomainError> {
        lock(&self.shown).push((position, frame.clone()));
        Ok(lock(&self.events).pop_front().unwrap_or(self.fallback))
    }

    async fn close(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Encoder writing mock videos instead of running a transcoder
#[derive(Debug, Default)]
pub struct MockEncoder {
    failing: BTreeSet<String>,
    corrupt: BTreeSet<String>,
    requests: Mutex<Vec<EncodeRequest>>,
}

impl MockEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the transcoder run for sources with this file name
    pub fn failing_for(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// Report success but write an undecodable output for this file name
    pub fn corrupting(mut self, file_name: &str) -> Self {
        self.corrupt.insert(file_name.to_string());
        self
    }

    pub fn requests(&self) -> Vec<EncodeRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl EncoderPort for MockEncoder {
    async fn encode(&self, request: &EncodeRequest) -> Result<EncodeReport, DomainError> {
        request.validate()?;
        lock(&self.requests).push(request.clone());

        let name = request
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.failing.contains(&name) {
            return Err(DomainError::TranscoderFailed {
                path: request.input.clone(),
                exit_code: Some(1),
                diagnostics: "mock transcoder failure".to_string(),
            });
        }

        let content = if self.corrupt.contains(&name) {
            "garbage\n".to_string()
        } else {
            let (_, _, frames) = parse_header(&request.input).unwrap_or((0, 0, 1));
            mock_video_header(request.rectangle.width, request.rectangle.height, frames)
        };
        fs::write(&request.output, content).map_err(|e| DomainError::TranscoderFailed {
            path: request.input.clone(),
            exit_code: None,
            diagnostics: e.to_string(),
        })?;

        Ok(EncodeReport {
            output: request.output.clone(),
            diagnostics: String::new(),
        })
    }
}
