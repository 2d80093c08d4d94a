// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fs_local;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod probe_ffmpeg_cli;
#[cfg(feature = "libav")]
pub mod probe_libav;
pub mod terminal_ui;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use fs_local::LocalFsAdapter;
#[cfg(any(test, feature = "test-mocks"))]
pub use mock::{MockEncoder, MockVideoSource, ScriptedPicker, ScriptedPreview, ScriptedPrompt};
pub use probe_ffmpeg_cli::FfmpegCliSource;
#[cfg(feature = "libav")]
pub use probe_libav::LibavVideoSource;
pub use terminal_ui::{
    TerminalConsole, TerminalPickerAdapter, TerminalPreviewAdapter, TerminalPromptAdapter,
};
pub use toml_config::TomlConfigAdapter;
