//! Configuration initialization and hierarchy management

use std::path::PathBuf;
use tracing::debug;

use crate::adapters::toml_config::{FileConfig, TomlConfigAdapter};
use crate::domain::errors::DomainError;
use crate::domain::rules::{PreviewGeometry, RetryPolicy, VideoClassifier};

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_X264_PRESET: &str = "medium";
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Environment variables and the settings they override
pub const ENV_LOG_LEVEL: &str = "CROPMIRROR_LOG_LEVEL";
pub const ENV_FFMPEG: &str = "CROPMIRROR_FFMPEG";
pub const ENV_FFPROBE: &str = "CROPMIRROR_FFPROBE";
pub const ENV_X264_PRESET: &str = "CROPMIRROR_X264_PRESET";

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub x264_preset: String,
    pub preview: PreviewGeometry,
    pub retry: RetryPolicy,
    pub classifier: VideoClassifier,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            x264_preset: DEFAULT_X264_PRESET.to_string(),
            preview: PreviewGeometry::default(),
            retry: RetryPolicy::unbounded(),
            classifier: VideoClassifier::default(),
        }
    }
}

/// Settings taken from the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub log_level: Option<String>,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    pub x264_preset: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            log_level: get(ENV_LOG_LEVEL),
            ffmpeg: get(ENV_FFMPEG).map(PathBuf::from),
            ffprobe: get(ENV_FFPROBE).map(PathBuf::from),
            x264_preset: get(ENV_X264_PRESET),
        }
    }
}

/// Settings given on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub config_file: Option<PathBuf>,
}

impl AppConfig {
    /// Apply file, then environment, then command line on top of the defaults
    pub fn resolve(
        file: Option<FileConfig>,
        env: &EnvOverrides,
        cli: &CliOverrides,
    ) -> Result<Self, DomainError> {
        let defaults = AppConfig::default();
        let file = file.unwrap_or_default();

        let log_level = cli
            .log_level
            .clone()
            .or_else(|| env.log_level.clone())
            .or(file.log_level)
            .unwrap_or(defaults.log_level)
            .to_lowercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(DomainError::Config(format!(
                "invalid log level '{}', expected one of {}",
                log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        let ffmpeg = env
            .ffmpeg
            .clone()
            .or(file.tools.ffmpeg)
            .unwrap_or(defaults.ffmpeg);
        let ffprobe = env
            .ffprobe
            .clone()
            .or(file.tools.ffprobe)
            .unwrap_or(defaults.ffprobe);
        let x264_preset = env
            .x264_preset
            .clone()
            .or(file.encoder.x264_preset)
            .unwrap_or(defaults.x264_preset);
        if x264_preset.trim().is_empty() {
            return Err(DomainError::Config("x264 preset cannot be empty".to_string()));
        }

        let preview = PreviewGeometry::new(
            file.preview.min_width.unwrap_or(defaults.preview.min_width),
            file.preview.min_height.unwrap_or(defaults.preview.min_height),
        )?;
        let retry = match file.roi.max_attempts {
            Some(max) => RetryPolicy::limited(max)?,
            None => defaults.retry,
        };
        let classifier = match file.discovery.video_extensions {
            Some(extensions) => VideoClassifier::new(extensions)?,
            None => defaults.classifier,
        };

        Ok(Self {
            log_level,
            ffmpeg,
            ffprobe,
            x264_preset,
            preview,
            retry,
            classifier,
        })
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &CliOverrides) -> Result<AppConfig, DomainError> {
    let file = TomlConfigAdapter::discover(cli.config_file.as_deref())?;
    let env = EnvOverrides::from_env();
    debug!(
        config_file = ?cli.config_file,
        file_loaded = file.is_some(),
        ?env,
        "Resolving configuration"
    );
    AppConfig::resolve(file, &env, cli)
}
