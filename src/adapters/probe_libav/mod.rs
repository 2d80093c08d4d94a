// Probe LibAV adapter - In-process frame decoding using libav

use ffmpeg_next as ffmpeg;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

static FFMPEG_INIT: Once = Once::new();

/// LibAV-based decode collaborator
pub struct LibavVideoSource;

impl LibavVideoSource {
    /// Create new LibAV source, initializing libav once per process
    pub fn new() -> Result<Self, DomainError> {
        let mut init_error = None;
        FFMPEG_INIT.call_once(|| {
            if let Err(e) = ffmpeg::init() {
                init_error = Some(e);
            }
        });
        match init_error {
            Some(e) => Err(DomainError::InternalError(format!(
                "FFmpeg initialization failed: {}",
                e
            ))),
            None => Ok(Self),
        }
    }
}

fn decode_failure(path: &Path, e: impl std::fmt::Display) -> DomainError {
    DomainError::DecodeFailure {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

impl VideoSourcePort for LibavVideoSource {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoHandle>, DomainError> {
        if !path.is_file() {
            return Err(DomainError::SourceNotFound(path.to_path_buf()));
        }

        let input = ffmpeg::format::input(&path).map_err(|e| decode_failure(path, e))?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| decode_failure(path, "no video stream"))?;

        let stream_index = stream.index();
        let time_base = f64::from(stream.time_base());
        let rate = f64::from(stream.avg_frame_rate());
        let frame_rate = if rate.is_finite() && rate > 0.0 { Some(rate) } else { None };
        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else {
            let seconds = stream.duration() as f64 * time_base;
            frame_rate.map_or(0, |fps| (seconds * fps).round().max(0.0) as u64)
        };

        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| decode_failure(path, e))?;
        let decoder = context
            .decoder()
            .video()
            .map_err(|e| decode_failure(path, e))?;

        let scaler = ffmpeg::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| decode_failure(path, e))?;

        debug!(path = %path.display(), frame_count, ?frame_rate, "Opened video with libav");

        Ok(Box::new(LibavHandle {
            path: path.to_path_buf(),
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            frame_rate,
            frame_count,
            target_pts: None,
            eof: false,
        }))
    }
}

/// Container timestamp to seek to and the first presentation timestamp to keep
#[derive(Debug, Clone, Copy, PartialEq)]
struct SeekPlan {
    timestamp: i64,
    target_pts: Option<i64>,
}

impl SeekPlan {
    /// Frame 0 is a rewind and needs no frame rate; other frames do
    fn for_frame(frame_index: u64, frame_rate: Option<f64>, time_base: f64) -> Option<Self> {
        if frame_index == 0 {
            return Some(Self {
                timestamp: 0,
                target_pts: None,
            });
        }
        let seconds = frame_index as f64 / frame_rate?;
        Some(Self {
            timestamp: (seconds * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64,
            target_pts: Some((seconds / time_base).round() as i64),
        })
    }
}

struct LibavHandle {
    path: PathBuf,
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    stream_index: usize,
    time_base: f64,
    frame_rate: Option<f64>,
    frame_count: u64,
    /// Frames before this presentation timestamp are dropped after a seek
    target_pts: Option<i64>,
    eof: bool,
}

impl LibavHandle {
    fn convert(&mut self, decoded: &ffmpeg::frame::Video) -> Result<Frame, DomainError> {
        let mut rgb = ffmpeg::frame::Video::empty();
        self.scaler
            .run(decoded, &mut rgb)
            .map_err(|e| decode_failure(&self.path, e))?;

        let width = rgb.width();
        let height = rgb.height();
        let row_bytes = width as usize * Frame::CHANNELS;
        let stride = rgb.stride(0);
        let plane = rgb.data(0);

        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            data.extend_from_slice(&plane[start..start + row_bytes]);
        }
        Frame::new(width, height, data)
    }
}

impl VideoHandle for LibavHandle {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), DomainError> {
        let plan = SeekPlan::for_frame(frame_index, self.frame_rate, self.time_base).ok_or_else(|| {
            decode_failure(&self.path, "cannot seek without a known frame rate")
        })?;

        // lands on the keyframe at or before the target, decoding runs forward from there
        self.input
            .seek(plan.timestamp, ..plan.timestamp + 1)
            .map_err(|e| decode_failure(&self.path, e))?;
        self.decoder.flush();
        self.target_pts = plan.target_pts;
        self.eof = false;
        Ok(())
    }

    fn read_next_frame(&mut self) -> Result<Option<Frame>, DomainError> {
        loop {
            let mut decoded = ffmpeg::frame::Video::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                if let (Some(target), Some(pts)) = (self.target_pts, decoded.pts()) {
                    if pts < target {
                        continue;
                    }
                }
                self.target_pts = None;
                return self.convert(&decoded).map(Some);
            }
            if self.eof {
                return Ok(None);
            }

            let mut packet = ffmpeg::Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.stream_index {
                        self.decoder
                            .send_packet(&packet)
                            .map_err(|e| decode_failure(&self.path, e))?;
                    }
                }
                Err(ffmpeg::Error::Eof) => {
                    self.eof = true;
                    self.decoder
                        .send_eof()
                        .map_err(|e| decode_failure(&self.path, e))?;
                }
                Err(e) => return Err(decode_failure(&self.path, e)),
            }
        }
    }
}
