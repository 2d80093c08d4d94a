use super::*;
use crate::adapters::mock::*;
use std::fs;
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    entry: VideoEntry,
    picker: Arc<ScriptedPicker>,
    preview: Arc<ScriptedPreview>,
    prompt: Arc<ScriptedPrompt>,
    interactor: RoiInteractor,
}

fn harness(
    frames: u64,
    picks: Vec<Option<RawSelection>>,
    events: Vec<PreviewEvent>,
    answers: Vec<bool>,
    retry_policy: RetryPolicy,
) -> Harness {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("b.avi");
    write_mock_video(&path, 640, 480, frames).unwrap();
    let entry = VideoEntry::new(dir.path(), &path).unwrap();

    let picker = Arc::new(ScriptedPicker::new(picks));
    let preview = Arc::new(ScriptedPreview::with_fallback(events, PreviewEvent::Cancel));
    let prompt = Arc::new(ScriptedPrompt::new(answers));
    let interactor = RoiInteractor::new(
        Arc::new(MockVideoSource::new()),
        picker.clone(),
        preview.clone(),
        prompt.clone(),
        PreviewGeometry::default(),
        retry_policy,
    );

    Harness {
        _dir: dir,
        entry,
        picker,
        preview,
        prompt,
        interactor,
    }
}

fn sel(x: i64, y: i64, w: i64, h: i64) -> Option<RawSelection> {
    Some(RawSelection::new(x, y, w, h))
}

#[tokio::test]
async fn test_valid_rectangle_confirmed_is_accepted() {
    let h = harness(
        5,
        vec![sel(10, 10, 100, 50)],
        vec![],
        vec![true],
        RetryPolicy::unbounded(),
    );

    let decision = h.interactor.select(&h.entry).await.unwrap();
    assert_eq!(
        decision,
        RoiDecision::Accepted(Rectangle::new(10, 10, 100, 50).unwrap())
    );
    assert_eq!(h.prompt.questions(), vec![CONFIRM_QUESTION.to_string()]);
    assert_eq!(h.picker.titles(), vec!["b.avi".to_string()]);
}

#[tokio::test]
async fn test_three_rejections_then_skip() {
    // three drawn rectangles rejected at confirmation, then nothing drawn and skip
    let h = harness(
        5,
        vec![sel(0, 0, 10, 10), sel(5, 5, 20, 20), sel(1, 1, 30, 30), None],
        vec![],
        vec![false, false, false, true],
        RetryPolicy::unbounded(),
    );

    let decision = h.interactor.select(&h.entry).await.unwrap();
    assert_eq!(decision, RoiDecision::Skipped);
    assert_eq!(
        h.prompt.questions(),
        vec![
            CONFIRM_QUESTION.to_string(),
            CONFIRM_QUESTION.to_string(),
            CONFIRM_QUESTION.to_string(),
            SKIP_QUESTION.to_string(),
        ]
    );
    assert_eq!(h.preview.sessions(), vec![5, 5, 5]);
}

#[tokio::test]
async fn test_invalid_selection_never_reaches_preview() {
    let h = harness(
        5,
        vec![sel(-1, 0, 10, 10), sel(0, 0, 0, 10), None, sel(2, 2, 8, 8)],
        vec![],
        vec![false, false, false, true],
        RetryPolicy::unbounded(),
    );

    let decision = h.interactor.select(&h.entry).await.unwrap();
    assert_eq!(decision, RoiDecision::Accepted(Rectangle::new(2, 2, 8, 8).unwrap()));
    assert_eq!(
        h.prompt.questions(),
        vec![
            SKIP_QUESTION.to_string(),
            SKIP_QUESTION.to_string(),
            SKIP_QUESTION.to_string(),
            CONFIRM_QUESTION.to_string(),
        ]
    );
    // only the valid rectangle was previewed
    assert_eq!(h.preview.sessions(), vec![5]);
}

#[tokio::test]
async fn test_unopenable_video_asks_to_skip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.avi");
    fs::write(&path, b"not a video").unwrap();
    let entry = VideoEntry::new(dir.path(), &path).unwrap();

    let picker = Arc::new(ScriptedPicker::new([]));
    let prompt = Arc::new(ScriptedPrompt::new([true]));
    let interactor = RoiInteractor::new(
        Arc::new(MockVideoSource::new()),
        picker.clone(),
        Arc::new(ScriptedPreview::new([])),
        prompt.clone(),
        PreviewGeometry::default(),
        RetryPolicy::unbounded(),
    );

    assert_eq!(interactor.select(&entry).await.unwrap(), RoiDecision::Skipped);
    assert!(picker.titles().is_empty());
    assert_eq!(prompt.questions(), vec![SKIP_QUESTION.to_string()]);
}

#[tokio::test]
async fn test_preview_plays_to_end_of_stream() {
    let h = harness(
        4,
        vec![sel(0, 0, 10, 10)],
        vec![PreviewEvent::Next, PreviewEvent::Next, PreviewEvent::Next, PreviewEvent::Next],
        vec![true],
        RetryPolicy::unbounded(),
    );

    h.interactor.select(&h.entry).await.unwrap();
    assert_eq!(h.preview.positions(), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_preview_seek_and_cancel() {
    let h = harness(
        10,
        vec![sel(0, 0, 10, 10)],
        vec![
            PreviewEvent::Next,
            PreviewEvent::Seek(7),
            PreviewEvent::Next,
            PreviewEvent::Seek(2),
            PreviewEvent::Cancel,
        ],
        vec![true],
        RetryPolicy::unbounded(),
    );

    h.interactor.select(&h.entry).await.unwrap();
    let shown = h.preview.shown();
    let positions: Vec<u64> = shown.iter().map(|(p, _)| *p).collect();
    assert_eq!(positions, vec![0, 1, 7, 8, 2]);

    // the frame shown at each position is the decoded frame with that index
    for (position, frame) in &shown {
        assert_eq!(frame.pixel(200, 40), Some(mock_frame_colour(*position)));
    }
}

#[tokio::test]
async fn test_seek_past_end_clamps_and_ends_playback() {
    let h = harness(
        3,
        vec![sel(0, 0, 10, 10)],
        vec![PreviewEvent::Seek(99)],
        vec![true],
        RetryPolicy::unbounded(),
    );

    h.interactor.select(&h.entry).await.unwrap();
    assert_eq!(h.preview.positions(), vec![0]);
    assert_eq!(h.prompt.questions(), vec![CONFIRM_QUESTION.to_string()]);
}

#[tokio::test]
async fn test_preview_frames_are_padded_to_minimum() {
    let h = harness(
        2,
        vec![sel(10, 10, 100, 50)],
        vec![PreviewEvent::Cancel],
        vec![true],
        RetryPolicy::unbounded(),
    );

    h.interactor.select(&h.entry).await.unwrap();
    let (_, frame) = &h.preview.shown()[0];
    assert_eq!((frame.width, frame.height), (400, 80));
    // 150 px border on the left, 15 px on top
    assert_eq!(frame.pixel(149, 15), Some(PreviewGeometry::BORDER));
    assert_eq!(frame.pixel(150, 15), Some(mock_frame_colour(0)));
    assert_eq!(frame.pixel(150, 14), Some(PreviewGeometry::BORDER));
}

#[tokio::test]
async fn test_attempt_limit_skips_without_asking() {
    let h = harness(
        5,
        vec![sel(0, 0, 10, 10), sel(0, 0, 20, 20)],
        vec![],
        vec![false, false],
        RetryPolicy::limited(2).unwrap(),
    );

    assert_eq!(h.interactor.select(&h.entry).await.unwrap(), RoiDecision::Skipped);
    assert_eq!(h.picker.titles().len(), 2);
    assert_eq!(h.prompt.questions().len(), 2);
}

#[tokio::test]
async fn test_console_failure_is_an_error() {
    let h = harness(5, vec![], vec![], vec![], RetryPolicy::unbounded());
    assert!(matches!(
        h.interactor.select(&h.entry).await,
        Err(DomainError::Ui(_))
    ));
}

struct FlakyHandle {
    bad_frames: u64,
    position: u64,
    frame_count: u64,
}

impl VideoHandle for FlakyHandle {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), DomainError> {
        self.position = frame_index;
        Ok(())
    }

    fn read_next_frame(&mut self) -> Result<Option<Frame>, DomainError> {
        let index = self.position;
        self.position += 1;
        if index >= self.frame_count {
            Ok(None)
        } else if index < self.bad_frames {
            Err(DomainError::DecodeFailure {
                path: "flaky.avi".into(),
                message: format!("corrupt frame {}", index),
            })
        } else {
            Ok(Some(Frame::filled(4, 4, mock_frame_colour(index))))
        }
    }
}

#[test]
fn test_first_decodable_frame_skips_corrupt_frames() {
    let mut handle = FlakyHandle {
        bad_frames: 2,
        position: 0,
        frame_count: 5,
    };
    let frame = read_first_decodable(&mut handle, Path::new("flaky.avi")).unwrap();
    assert_eq!(frame.pixel(0, 0), Some(mock_frame_colour(2)));
}

#[test]
fn test_first_decodable_frame_gives_up() {
    let mut all_bad = FlakyHandle {
        bad_frames: 3,
        position: 0,
        frame_count: 3,
    };
    assert!(read_first_decodable(&mut all_bad, Path::new("flaky.avi")).is_err());

    let mut empty = FlakyHandle {
        bad_frames: 0,
        position: 0,
        frame_count: 0,
    };
    assert!(matches!(
        read_first_decodable(&mut empty, Path::new("flaky.avi")),
        Err(DomainError::DecodeFailure { .. })
    ));
}
