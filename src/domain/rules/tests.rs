// Unit tests for business rules

use super::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[test]
fn test_default_classifier_matches_known_extensions() {
    let classifier = VideoClassifier::default();
    assert!(classifier.is_video(Path::new("a.avi")));
    assert!(classifier.is_video(Path::new("dir/B.MP4")));
    assert!(classifier.is_video(Path::new("clip.mkv")));
    assert!(!classifier.is_video(Path::new("notes.txt")));
    assert!(!classifier.is_video(Path::new("avi")));
}

#[test]
fn test_classifier_normalizes_extensions() {
    let classifier = VideoClassifier::new([".AVI", " mov "]).unwrap();
    let extensions: Vec<&str> = classifier.extensions().collect();
    assert_eq!(extensions, vec!["avi", "mov"]);
    assert!(classifier.is_video(Path::new("x.Mov")));
    assert!(!classifier.is_video(Path::new("x.mp4")));
}

#[test]
fn test_classifier_requires_an_extension() {
    assert!(VideoClassifier::new(Vec::<String>::new()).is_err());
    assert!(VideoClassifier::new([" ", "."]).is_err());
}

#[test]
fn test_cropped_relative_path() {
    assert_eq!(
        OutputNaming::cropped_relative_path(Path::new("exp1/run.avi"), OutputFormat::Mp4),
        Path::new("exp1/run_cropped.mp4")
    );
    assert_eq!(
        OutputNaming::cropped_relative_path(Path::new("a.avi"), OutputFormat::Ffv1),
        Path::new("a_cropped.mkv")
    );
    assert_eq!(
        OutputNaming::cropped_relative_path(Path::new("a.b.mov"), OutputFormat::Libx264Avi),
        Path::new("a.b_cropped.avi")
    );
}

#[test]
fn test_colliding_sources_share_an_output_name() {
    let sources = [
        Path::new("a.avi"),
        Path::new("a.mov"),
        Path::new("a.AVI"),
        Path::new("b.avi"),
        Path::new("exp1/a.avi"),
    ];
    let colliding = OutputNaming::colliding_sources(sources, OutputFormat::Mp4);
    assert_eq!(
        colliding,
        BTreeSet::from([
            PathBuf::from("a.AVI"),
            PathBuf::from("a.avi"),
            PathBuf::from("a.mov"),
        ])
    );

    assert!(OutputNaming::colliding_sources([Path::new("a.avi"), Path::new("b.avi")], OutputFormat::Ffv1).is_empty());
}

#[test]
fn test_split_padding() {
    assert_eq!(PreviewGeometry::split_padding(400, 400), (0, 0));
    assert_eq!(PreviewGeometry::split_padding(500, 400), (0, 0));
    assert_eq!(PreviewGeometry::split_padding(100, 400), (150, 150));
    assert_eq!(PreviewGeometry::split_padding(51, 80), (14, 15));
}

#[test]
fn test_preview_geometry_rejects_zero() {
    assert!(PreviewGeometry::new(0, 80).is_err());
    assert!(PreviewGeometry::new(400, 0).is_err());
    assert_eq!(PreviewGeometry::new(400, 80).unwrap(), PreviewGeometry::default());
}

#[test]
fn test_display_frame_is_cropped_then_padded() {
    let geometry = PreviewGeometry::new(8, 4).unwrap();
    let frame = Frame::filled(20, 20, [200, 100, 50]);
    let roi = Rectangle::new(2, 2, 4, 2).unwrap();

    let shown = geometry.display_frame(&frame, &roi);
    assert_eq!((shown.width, shown.height), (8, 4));
    assert_eq!(shown.pixel(0, 0), Some(PreviewGeometry::BORDER));
    assert_eq!(shown.pixel(2, 1), Some([200, 100, 50]));
    assert_eq!(shown.pixel(5, 2), Some([200, 100, 50]));
    assert_eq!(shown.pixel(6, 2), Some(PreviewGeometry::BORDER));
}

#[test]
fn test_retry_policy() {
    let unbounded = RetryPolicy::unbounded();
    assert!(unbounded.allows(1_000_000));

    let limited = RetryPolicy::limited(2).unwrap();
    assert!(limited.allows(0));
    assert!(limited.allows(1));
    assert!(!limited.allows(2));

    assert!(RetryPolicy::limited(0).is_err());
}
