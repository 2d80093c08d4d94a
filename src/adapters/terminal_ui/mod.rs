//! Terminal operator console
//!
//! Implements the picker, preview and prompt collaborators on top of stdin and
//! stdout. Frames are written as PNG snapshots the operator can keep open in an
//! image viewer that reloads on change.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Shared stdin reader and snapshot directory
pub struct TerminalConsole {
    lines: Mutex<Lines<BufReader<Stdin>>>,
    snapshots: TempDir,
}

impl TerminalConsole {
    pub fn new() -> Result<Self, DomainError> {
        let snapshots = tempfile::Builder::new()
            .prefix("cropmirror-")
            .tempdir()
            .map_err(|e| DomainError::Ui(format!("cannot create snapshot directory: {}", e)))?;

        Ok(Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            snapshots,
        })
    }

    /// Print `prompt` without a newline and read one trimmed line
    async fn read_line(&self, prompt: &str) -> Result<String, DomainError> {
        print!("{}", prompt);
        std::io::stdout()
            .flush()
            .map_err(|e| DomainError::Ui(e.to_string()))?;

        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Ok(line.trim().to_string()),
            Ok(None) => Err(DomainError::Ui("standard input closed".to_string())),
            Err(e) => Err(DomainError::Ui(e.to_string())),
        }
    }

    /// Write `frame` to a PNG snapshot named `name`
    fn snapshot(&self, name: &str, frame: &Frame) -> Result<PathBuf, DomainError> {
        let path = self.snapshots.path().join(name);
        let image = image::RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or_else(|| DomainError::Ui("frame buffer does not match its size".to_string()))?;
        image
            .save(&path)
            .map_err(|e| DomainError::Ui(format!("cannot write {}: {}", path.display(), e)))?;
        Ok(path)
    }

    pub fn snapshot_dir(&self) -> &Path {
        self.snapshots.path()
    }
}

/// Interpret one line of picker input
pub fn parse_pick_input(line: &str) -> Option<RawSelection> {
    if line.is_empty() {
        return None;
    }
    RawSelection::parse(line).ok()
}

/// Interpret one line of preview input
pub fn parse_preview_input(line: &str) -> PreviewEvent {
    match line.to_lowercase().as_str() {
        "q" | "quit" => PreviewEvent::Cancel,
        other => other
            .parse::<u64>()
            .map(PreviewEvent::Seek)
            .unwrap_or(PreviewEvent::Next),
    }
}

/// Interpret one line of yes/no input
pub fn parse_answer(line: &str) -> Option<bool> {
    match line.to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Rectangle picker reading `x,y,w,h` from the terminal
pub struct TerminalPickerAdapter {
    console: std::sync::Arc<TerminalConsole>,
}

impl TerminalPickerAdapter {
    pub fn new(console: std::sync::Arc<TerminalConsole>) -> Self {
        Self { console }
    }
}

#[async_trait]
impl RoiPickerPort for TerminalPickerAdapter {
    async fn pick(&self, title: &str, frame: &Frame) -> Result<Option<RawSelection>, DomainError> {
        let snapshot = self.console.snapshot("select.png", frame)?;
        println!();
        println!("== {} ==", title);
        println!(
            "First frame ({}x{}) written to {}",
            frame.width,
            frame.height,
            snapshot.display()
        );

        let line = self
            .console
            .read_line("Region as x,y,width,height (empty for none): ")
            .await?;
        let selection = parse_pick_input(&line);
        if selection.is_none() && !line.is_empty() {
            println!("Could not read '{}' as four integers", line);
        }
        Ok(selection)
    }
}

/// Step-through preview writing each cropped frame to a snapshot
pub struct TerminalPreviewAdapter {
    console: std::sync::Arc<TerminalConsole>,
    frame_count: AtomicU64,
}

impl TerminalPreviewAdapter {
    pub fn new(console: std::sync::Arc<TerminalConsole>) -> Self {
        Self {
            console,
            frame_count: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl PreviewPort for TerminalPreviewAdapter {
    async fn open(&self, title: &str, frame_count: u64) -> Result<(), DomainError> {
        self.frame_count.store(frame_count, Ordering::Relaxed);
        println!();
        println!("== {} ==", title);
        println!(
            "Preview written to {} (Enter: next frame, number: jump to frame, q: stop)",
            self.console.snapshot_dir().join("preview.png").display()
        );
        Ok(())
    }

    async fn show(&self, frame: &Frame, position: u64) -> Result<PreviewEvent, DomainError> {
        self.console.snapshot("preview.png", frame)?;
        let total = self.frame_count.load(Ordering::Relaxed);
        let line = self
            .console
            .read_line(&format!("frame {}/{} > ", position, total))
            .await?;
        let event = parse_preview_input(&line);
        debug!(position, ?event, "Preview input");
        Ok(event)
    }

    async fn close(&self) -> Result<(), DomainError> {
        println!();
        Ok(())
    }
}

/// Yes/no questions on the terminal
pub struct TerminalPromptAdapter {
    console: std::sync::Arc<TerminalConsole>,
}

impl TerminalPromptAdapter {
    pub fn new(console: std::sync::Arc<TerminalConsole>) -> Self {
        Self { console }
    }
}

#[async_trait]
impl PromptPort for TerminalPromptAdapter {
    async fn ask(&self, title: &str, message: &str) -> Result<bool, DomainError> {
        loop {
            let line = self
                .console
                .read_line(&format!("[{}] {} [y/n] ", title, message))
                .await?;
            if let Some(answer) = parse_answer(&line) {
                return Ok(answer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pick_input() {
        assert_eq!(parse_pick_input(""), None);
        assert_eq!(
            parse_pick_input("10,10,100,50"),
            Some(RawSelection::new(10, 10, 100, 50))
        );
        // negative values pass through; the validity predicate rejects them later
        assert_eq!(
            parse_pick_input("-1 0 5 5"),
            Some(RawSelection::new(-1, 0, 5, 5))
        );
        assert_eq!(parse_pick_input("ten,10,100,50"), None);
    }

    #[test]
    fn test_parse_preview_input() {
        assert_eq!(parse_preview_input(""), PreviewEvent::Next);
        assert_eq!(parse_preview_input("q"), PreviewEvent::Cancel);
        assert_eq!(parse_preview_input("QUIT"), PreviewEvent::Cancel);
        assert_eq!(parse_preview_input("42"), PreviewEvent::Seek(42));
        assert_eq!(parse_preview_input("?"), PreviewEvent::Next);
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y"), Some(true));
        assert_eq!(parse_answer("Yes"), Some(true));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer("maybe"), None);
    }

    #[tokio::test]
    async fn test_snapshot_writes_png() {
        let console = TerminalConsole::new().unwrap();
        let path = console
            .snapshot("select.png", &Frame::filled(4, 2, [10, 20, 30]))
            .unwrap();
        let image = image::open(&path).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(3, 1).0, [10, 20, 30]);
    }
}
