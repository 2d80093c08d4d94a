//! FFprobe/FFmpeg CLI adapter for frame access
//!
//! Stream geometry comes from `ffprobe`; individual frames are decoded by
//! `ffmpeg` into raw RGB24 on stdout.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Stream properties reported by ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct StreamProbe {
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
    pub frame_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

impl StreamProbe {
    /// Parse `ffprobe -of json -show_entries stream=...` output
    pub fn from_json(path: &Path, json: &str) -> Result<Self, DomainError> {
        let decode_failure = |message: String| DomainError::DecodeFailure {
            path: path.to_path_buf(),
            message,
        };

        let parsed: ProbeOutput = serde_json::from_str(json)
            .map_err(|e| decode_failure(format!("unreadable ffprobe output: {}", e)))?;
        let stream = parsed
            .streams
            .into_iter()
            .next()
            .ok_or_else(|| decode_failure("no video stream".to_string()))?;

        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(decode_failure("video stream has no dimensions".to_string())),
        };

        let frame_rate = stream.avg_frame_rate.as_deref().and_then(parse_rational);
        let frame_count = stream
            .nb_frames
            .as_deref()
            .and_then(|n| n.parse::<u64>().ok())
            .or_else(|| {
                let duration = stream.duration.as_deref()?.parse::<f64>().ok()?;
                Some((duration * frame_rate?).round() as u64)
            })
            .unwrap_or(0);

        Ok(Self {
            width,
            height,
            frame_count,
            frame_rate,
        })
    }
}

/// Parse `num/den` frame rates; zero or malformed rates yield `None`
fn parse_rational(value: &str) -> Option<f64> {
    let (num, den) = value.split_once('/').unwrap_or((value, "1"));
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if num <= 0.0 || den <= 0.0 {
        None
    } else {
        Some(num / den)
    }
}

/// Decode collaborator backed by the ffprobe and ffmpeg binaries
pub struct FfmpegCliSource {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegCliSource {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn probe(&self, path: &Path) -> Result<StreamProbe, DomainError> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-select_streams", "v:0", "-show_entries"])
            .arg("stream=width,height,nb_frames,avg_frame_rate,duration")
            .args(["-of", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DomainError::DecodeFailure {
                path: path.to_path_buf(),
                message: format!("failed to start {}: {}", self.ffprobe.display(), e),
            })?;

        if !output.status.success() {
            return Err(DomainError::DecodeFailure {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        StreamProbe::from_json(path, &String::from_utf8_lossy(&output.stdout))
    }
}

impl VideoSourcePort for FfmpegCliSource {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoHandle>, DomainError> {
        if !path.is_file() {
            return Err(DomainError::SourceNotFound(path.to_path_buf()));
        }
        let probe = self.probe(path)?;
        debug!(path = %path.display(), ?probe, "Opened video");

        Ok(Box::new(FfmpegCliHandle {
            ffmpeg: self.ffmpeg.clone(),
            path: path.to_path_buf(),
            probe,
            position: 0,
        }))
    }
}

/// One opened video; every read decodes a single frame in a fresh process
struct FfmpegCliHandle {
    ffmpeg: PathBuf,
    path: PathBuf,
    probe: StreamProbe,
    position: u64,
}

impl FfmpegCliHandle {
    fn frame_bytes(&self) -> usize {
        self.probe.width as usize * self.probe.height as usize * Frame::CHANNELS
    }

    fn decode_command(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-v", "error", "-nostdin"]);
        match self.probe.frame_rate {
            // input seeking is frame accurate when decoding
            Some(rate) => {
                cmd.arg("-ss")
                    .arg(format!("{:.6}", self.position as f64 / rate))
                    .arg("-i")
                    .arg(&self.path);
            }
            None => {
                cmd.arg("-i")
                    .arg(&self.path)
                    .arg("-vf")
                    .arg(format!("select=eq(n\\,{})", self.position))
                    .args(["-fps_mode", "passthrough"]);
            }
        }
        cmd.args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"]);
        cmd
    }
}

impl VideoHandle for FfmpegCliHandle {
    fn frame_count(&self) -> u64 {
        self.probe.frame_count
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), DomainError> {
        self.position = frame_index;
        Ok(())
    }

    fn read_next_frame(&mut self) -> Result<Option<Frame>, DomainError> {
        if self.probe.frame_count > 0 && self.position >= self.probe.frame_count {
            return Ok(None);
        }

        let output = self
            .decode_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DomainError::DecodeFailure {
                path: self.path.clone(),
                message: format!("failed to start {}: {}", self.ffmpeg.display(), e),
            })?;

        if !output.status.success() {
            return Err(DomainError::DecodeFailure {
                path: self.path.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Ok(None);
        }
        if output.stdout.len() < self.frame_bytes() {
            return Err(DomainError::DecodeFailure {
                path: self.path.clone(),
                message: format!(
                    "short frame: {} of {} bytes",
                    output.stdout.len(),
                    self.frame_bytes()
                ),
            });
        }

        let mut data = output.stdout;
        data.truncate(self.frame_bytes());
        let frame = Frame::new(self.probe.width, self.probe.height, data)?;
        self.position += 1;
        Ok(Some(frame))
    }
}
