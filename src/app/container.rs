use std::sync::Arc;

use crate::adapters::{
    FFmpegAdapter, LocalFsAdapter, TerminalConsole, TerminalPickerAdapter, TerminalPreviewAdapter,
    TerminalPromptAdapter,
};
use crate::app::{
    CropInteractor, MirrorInteractor, PipelineInteractor, RoiInteractor, VerifyInteractor,
};
use crate::config_initialization::AppConfig;
use crate::domain::errors::DomainError;
use crate::ports::{EncoderPort, FsPort, PreviewPort, PromptPort, RoiPickerPort, VideoSourcePort};

pub trait AppContainer: Send + Sync {
    fn mirror_interactor(&self) -> Arc<MirrorInteractor>;
    fn crop_interactor(&self) -> Arc<CropInteractor>;
    fn verify_interactor(&self) -> Arc<VerifyInteractor>;
    fn pipeline_interactor(&self) -> Arc<PipelineInteractor>;
}

/// Collaborators the interactors are wired from
pub struct AppPorts {
    pub video_source: Arc<dyn VideoSourcePort>,
    pub picker: Arc<dyn RoiPickerPort>,
    pub preview: Arc<dyn PreviewPort>,
    pub prompt: Arc<dyn PromptPort>,
    pub encoder: Arc<dyn EncoderPort>,
    pub fs: Arc<dyn FsPort>,
}

impl AppPorts {
    /// Real adapters: ffmpeg for encoding, the terminal for the operator
    pub fn production(config: &AppConfig) -> Result<Self, DomainError> {
        let console = Arc::new(TerminalConsole::new()?);

        Ok(Self {
            video_source: video_source(config)?,
            picker: Arc::new(TerminalPickerAdapter::new(Arc::clone(&console))),
            preview: Arc::new(TerminalPreviewAdapter::new(Arc::clone(&console))),
            prompt: Arc::new(TerminalPromptAdapter::new(console)),
            encoder: Arc::new(FFmpegAdapter::new(&config.ffmpeg, config.x264_preset.clone())?),
            fs: Arc::new(LocalFsAdapter::new()?),
        })
    }
}

#[cfg(feature = "libav")]
fn video_source(_config: &AppConfig) -> Result<Arc<dyn VideoSourcePort>, DomainError> {
    Ok(Arc::new(crate::adapters::LibavVideoSource::new()?))
}

#[cfg(not(feature = "libav"))]
fn video_source(config: &AppConfig) -> Result<Arc<dyn VideoSourcePort>, DomainError> {
    Ok(Arc::new(crate::adapters::FfmpegCliSource::new(
        &config.ffmpeg,
        &config.ffprobe,
    )))
}

pub struct DefaultAppContainer {
    mirror_interactor: Arc<MirrorInteractor>,
    crop_interactor: Arc<CropInteractor>,
    verify_interactor: Arc<VerifyInteractor>,
    pipeline_interactor: Arc<PipelineInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        Ok(Self::with_ports(config, AppPorts::production(config)?))
    }

    pub fn with_ports(config: &AppConfig, ports: AppPorts) -> Self {
        let roi_interactor = Arc::new(RoiInteractor::new(
            Arc::clone(&ports.video_source),
            ports.picker,
            ports.preview,
            ports.prompt,
            config.preview,
            config.retry,
        ));

        let mirror_interactor = Arc::new(MirrorInteractor::new(
            Arc::clone(&ports.fs),
            config.classifier.clone(),
        ));

        let crop_interactor = Arc::new(CropInteractor::new(
            roi_interactor,
            ports.encoder,
            Arc::clone(&ports.fs),
            config.classifier.clone(),
        ));

        let verify_interactor = Arc::new(VerifyInteractor::new(
            ports.video_source,
            ports.fs,
            config.classifier.clone(),
        ));

        let pipeline_interactor = Arc::new(PipelineInteractor::new(
            Arc::clone(&mirror_interactor),
            Arc::clone(&crop_interactor),
            Arc::clone(&verify_interactor),
        ));

        Self {
            mirror_interactor,
            crop_interactor,
            verify_interactor,
            pipeline_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn mirror_interactor(&self) -> Arc<MirrorInteractor> {
        Arc::clone(&self.mirror_interactor)
    }

    fn crop_interactor(&self) -> Arc<CropInteractor> {
        Arc::clone(&self.crop_interactor)
    }

    fn verify_interactor(&self) -> Arc<VerifyInteractor> {
        Arc::clone(&self.verify_interactor)
    }

    fn pipeline_interactor(&self) -> Arc<PipelineInteractor> {
        Arc::clone(&self.pipeline_interactor)
    }
}
