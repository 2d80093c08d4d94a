//! FFmpeg execution adapter
//!
//! Crops and re-encodes a video by running the `ffmpeg` binary, one process per
//! request, to completion.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Number of trailing stderr lines kept as diagnostics
const DIAGNOSTIC_TAIL_LINES: usize = 20;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    ffmpeg: PathBuf,
    x264_preset: String,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(ffmpeg: impl Into<PathBuf>, x264_preset: impl Into<String>) -> Result<Self, DomainError> {
        let x264_preset = x264_preset.into();
        if x264_preset.trim().is_empty() {
            return Err(DomainError::Config("x264 preset cannot be empty".to_string()));
        }
        Ok(Self {
            ffmpeg: ffmpeg.into(),
            x264_preset,
        })
    }

    /// Codec and container arguments for a format choice
    pub fn codec_args(&self, format: OutputFormat) -> Vec<String> {
        let mut args: Vec<String> = match format {
            OutputFormat::Ffv1 => vec!["-c:v", "ffv1", "-level", "3"]
                .into_iter()
                .map(String::from)
                .collect(),
            OutputFormat::Mp4 | OutputFormat::Libx264Avi => vec![
                "-c:v".to_string(),
                "libx264".to_string(),
                "-preset".to_string(),
                self.x264_preset.clone(),
                "-qp".to_string(),
                "0".to_string(),
            ],
        };
        args.push("-f".to_string());
        args.push(format.container().to_string());
        args
    }

    /// Full argument list for one request
    pub fn build_args(&self, request: &EncodeRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-y".into(),
            "-i".into(),
            request.input.clone().into_os_string(),
            "-vf".into(),
            request.rectangle.crop_filter().into(),
        ];
        args.extend(self.codec_args(request.format).into_iter().map(OsString::from));
        args.push(request.output.clone().into_os_string());
        args
    }

    fn diagnostic_tail(stderr: &[u8]) -> String {
        let text = String::from_utf8_lossy(stderr);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES);
        lines[start..].join("\n")
    }
}

#[async_trait]
impl EncoderPort for FFmpegAdapter {
    async fn encode(&self, request: &EncodeRequest) -> Result<EncodeReport, DomainError> {
        request.validate()?;

        let args = self.build_args(request);
        debug!(program = %self.ffmpeg.display(), ?args, "Spawning transcoder");
        info!(
            input = %request.input.display(),
            output = %request.output.display(),
            roi = %request.rectangle,
            format = %request.format,
            "Encoding cropped video"
        );

        let output = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::TranscoderFailed {
                path: request.input.clone(),
                exit_code: None,
                diagnostics: format!("failed to start {}: {}", self.ffmpeg.display(), e),
            })?;

        let diagnostics = Self::diagnostic_tail(&output.stderr);
        if !output.status.success() {
            warn!(
                input = %request.input.display(),
                code = ?output.status.code(),
                "Transcoder exited with failure"
            );
            return Err(DomainError::TranscoderFailed {
                path: request.input.clone(),
                exit_code: output.status.code(),
                diagnostics,
            });
        }

        Ok(EncodeReport {
            output: request.output.clone(),
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn request(dir: &TempDir, rectangle: Rectangle, format: OutputFormat) -> EncodeRequest {
        let input = dir.path().join("a.avi");
        fs::write(&input, b"not really a video").unwrap();
        EncodeRequest {
            input,
            rectangle,
            output: dir.path().join("a_cropped.mp4"),
            format,
        }
    }

    #[test]
    fn test_codec_args_per_format() {
        let adapter = FFmpegAdapter::new("ffmpeg", "medium").unwrap();
        assert_eq!(
            adapter.codec_args(OutputFormat::Ffv1),
            vec!["-c:v", "ffv1", "-level", "3", "-f", "matroska"]
        );
        assert_eq!(
            adapter.codec_args(OutputFormat::Mp4),
            vec!["-c:v", "libx264", "-preset", "medium", "-qp", "0", "-f", "mp4"]
        );
        assert_eq!(
            adapter.codec_args(OutputFormat::Libx264Avi),
            vec!["-c:v", "libx264", "-preset", "medium", "-qp", "0", "-f", "avi"]
        );
    }

    #[test]
    fn test_build_args_places_crop_filter() {
        let dir = TempDir::new().unwrap();
        let adapter = FFmpegAdapter::new("ffmpeg", "slow").unwrap();
        let req = request(&dir, Rectangle::new(10, 10, 100, 50).unwrap(), OutputFormat::Mp4);

        let args = adapter.build_args(&req);
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "crop=100:50:10:10");
        assert_eq!(args.last().unwrap(), req.output.as_os_str());
        assert!(args.iter().any(|a| a == "slow"));
    }

    #[test]
    fn test_empty_preset_rejected() {
        assert!(FFmpegAdapter::new("ffmpeg", " ").is_err());
    }

    #[tokio::test]
    async fn test_zero_width_rejected_before_spawning() {
        let dir = TempDir::new().unwrap();
        // a program that cannot exist: reaching the spawn would yield TranscoderFailed
        let adapter = FFmpegAdapter::new(dir.path().join("no-such-ffmpeg"), "medium").unwrap();
        let rect = Rectangle {
            x: 0,
            y: 0,
            width: 0,
            height: 10,
        };

        let err = adapter
            .encode(&request(&dir, rect, OutputFormat::Mp4))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EncodeRejected { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_missing_source_rejected_before_spawning() {
        let dir = TempDir::new().unwrap();
        let adapter = FFmpegAdapter::new(dir.path().join("no-such-ffmpeg"), "medium").unwrap();
        let req = EncodeRequest {
            input: dir.path().join("gone.avi"),
            rectangle: Rectangle::new(0, 0, 4, 4).unwrap(),
            output: dir.path().join("gone_cropped.mkv"),
            format: OutputFormat::Ffv1,
        };

        let err = adapter.encode(&req).await.unwrap_err();
        assert_eq!(err, DomainError::SourceNotFound(dir.path().join("gone.avi")));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_transcoder_failure() {
        let dir = TempDir::new().unwrap();
        let adapter = FFmpegAdapter::new(dir.path().join("no-such-ffmpeg"), "medium").unwrap();

        let err = adapter
            .encode(&request(&dir, Rectangle::new(0, 0, 4, 4).unwrap(), OutputFormat::Mp4))
            .await
            .unwrap_err();
        assert!(
            matches!(err, DomainError::TranscoderFailed { exit_code: None, .. }),
            "{err:?}"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_carries_diagnostics() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        fs::write(&script, "#!/bin/sh\necho 'crop area out of frame' >&2\nexit 3\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        }
        let adapter = FFmpegAdapter::new(&script, "medium").unwrap();

        let err = adapter
            .encode(&request(&dir, Rectangle::new(0, 0, 4, 4).unwrap(), OutputFormat::Mp4))
            .await
            .unwrap_err();
        match err {
            DomainError::TranscoderFailed {
                exit_code,
                diagnostics,
                ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert!(diagnostics.contains("crop area out of frame"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
