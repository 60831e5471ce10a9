//! Frame extraction integration tests.

mod common;

use std::{fs, sync::Arc};

use common::{HEIGHT, RecordingProgress, SyntheticSource, WIDTH, file_names};
use vidprep::{ExtractOptions, OperationType, PrepError, extract_frames, write_frame};

#[test]
fn writes_one_contiguous_file_per_frame() {
    let root = tempfile::tempdir().unwrap();
    let mut source = SyntheticSource::new(12);

    let summary = extract_frames(
        &mut source,
        root.path(),
        "videos/ladder/left.MP4",
        false,
        &ExtractOptions::new(),
    )
    .expect("extraction failed");

    assert_eq!(summary.basename, "left");
    assert_eq!(summary.directory, root.path().join("left"));
    assert_eq!(summary.frames_written, 12);
    assert_eq!(summary.frames_reported, 12);
    assert!(summary.sampling.is_none());

    let expected: Vec<String> = (0..12).map(|index| format!("left_{index:05}.jpg")).collect();
    assert_eq!(file_names(&summary.directory), expected);
}

#[test]
fn written_frames_are_decodable_jpegs() {
    let root = tempfile::tempdir().unwrap();
    let mut source = SyntheticSource::new(2);

    let summary = extract_frames(&mut source, root.path(), "cam.mp4", false, &ExtractOptions::new())
        .unwrap();

    let path = summary.directory.join("cam_00001.jpg");
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8], "missing JPEG SOI marker");

    let decoded = image::open(&path).unwrap();
    assert_eq!(decoded.width(), WIDTH);
    assert_eq!(decoded.height(), HEIGHT);
}

#[test]
fn lower_quality_produces_smaller_files() {
    let root = tempfile::tempdir().unwrap();
    let frame = image::DynamicImage::ImageRgb8(image::RgbImage::from_fn(128, 96, |x, y| {
        image::Rgb([(x * 7 ^ y * 13) as u8, (x * y) as u8, (x + y * 3) as u8])
    }));
    let low = root.path().join("low.jpg");
    let high = root.path().join("high.jpg");

    write_frame(&frame, &low, 20).unwrap();
    write_frame(&frame, &high, 95).unwrap();

    let low_size = fs::metadata(&low).unwrap().len();
    let high_size = fs::metadata(&high).unwrap().len();
    assert!(low_size < high_size, "{low_size} >= {high_size}");
}

#[test]
fn empty_source_leaves_empty_directory() {
    let root = tempfile::tempdir().unwrap();
    let mut source = SyntheticSource::new(0);

    let summary =
        extract_frames(&mut source, root.path(), "empty.mp4", false, &ExtractOptions::new())
            .unwrap();

    assert_eq!(summary.frames_written, 0);
    assert!(summary.directory.is_dir());
    assert!(file_names(&summary.directory).is_empty());
    assert!(!root.path().join("sampled_empty").exists());
}

#[test]
fn existing_directory_is_reused() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("right")).unwrap();
    let mut source = SyntheticSource::new(3);

    let summary =
        extract_frames(&mut source, root.path(), "right.MP4", false, &ExtractOptions::new())
            .unwrap();

    assert_eq!(summary.frames_written, 3);
}

#[test]
fn reported_count_can_differ_from_decoded_count() {
    let root = tempfile::tempdir().unwrap();
    let mut source = SyntheticSource::new(4).with_reported(6);

    let summary =
        extract_frames(&mut source, root.path(), "head.MP4", false, &ExtractOptions::new())
            .unwrap();

    assert_eq!(summary.frames_written, 4);
    assert_eq!(summary.frames_reported, 6);
    assert_eq!(file_names(&summary.directory).len(), 4);
}

#[test]
fn write_failure_aborts_at_that_frame() {
    let root = tempfile::tempdir().unwrap();
    let frame_dir = root.path().join("head");
    fs::create_dir_all(frame_dir.join("head_00002.jpg")).unwrap();
    let mut source = SyntheticSource::new(5);

    let error = extract_frames(&mut source, root.path(), "head.MP4", false, &ExtractOptions::new())
        .unwrap_err();

    match error {
        PrepError::FrameWrite { index, path, .. } => {
            assert_eq!(index, 2);
            assert_eq!(path, frame_dir.join("head_00002.jpg"));
        }
        other => panic!("Expected FrameWrite, got: {other}"),
    }
    assert!(!frame_dir.join("head_00003.jpg").exists());
}

#[test]
fn unusable_output_root_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let blocker = root.path().join("not_a_dir");
    fs::write(&blocker, b"file").unwrap();
    let mut source = SyntheticSource::new(1);

    let result = extract_frames(&mut source, &blocker, "left.MP4", false, &ExtractOptions::new());
    assert!(matches!(result, Err(PrepError::IoError(_))));
}

#[test]
fn source_path_without_name_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let mut source = SyntheticSource::new(1);

    let result = extract_frames(&mut source, root.path(), "/", false, &ExtractOptions::new());
    assert!(matches!(result, Err(PrepError::InvalidSourcePath(_))));
}

#[test]
fn invalid_quality_is_rejected_before_writing() {
    let root = tempfile::tempdir().unwrap();
    let mut source = SyntheticSource::new(1);
    let options = ExtractOptions::new().with_jpeg_quality(0);

    let result = extract_frames(&mut source, root.path(), "left.MP4", false, &options);
    assert!(matches!(result, Err(PrepError::InvalidQuality(0))));
    assert!(!root.path().join("left").exists());
}

#[test]
fn progress_reports_frames_against_reported_total() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Arc::new(RecordingProgress::default());
    let options = ExtractOptions::new().with_progress(recorder.clone());
    let mut source = SyntheticSource::new(6);

    extract_frames(&mut source, root.path(), "left.MP4", false, &options).unwrap();

    let infos = recorder.infos.lock().unwrap();
    assert!(!infos.is_empty(), "Expected progress callbacks");
    for info in infos.iter() {
        assert_eq!(info.operation, OperationType::FrameExtraction);
        assert_eq!(info.label, "left");
        assert_eq!(info.total, Some(6));
    }
    for window in infos.windows(2) {
        assert!(window[1].current >= window[0].current);
    }
    assert_eq!(infos.last().unwrap().current, 6);
}

#[test]
fn scene_extraction_samples_and_removes_frames() {
    let root = tempfile::tempdir().unwrap();
    let mut source = SyntheticSource::new(23);

    let summary =
        extract_frames(&mut source, root.path(), "scene.MP4", true, &ExtractOptions::new())
            .unwrap();

    assert_eq!(summary.frames_written, 23);
    let sampling = summary.sampling.expect("scene job should sample");
    assert_eq!(sampling.sampled, 4);
    assert_eq!(sampling.original, 23);
    assert_eq!(
        file_names(&sampling.sampled_directory),
        vec![
            "scene_00004.jpg",
            "scene_00009.jpg",
            "scene_00014.jpg",
            "scene_00019.jpg"
        ]
    );
    assert!(!root.path().join("scene").exists());
}

#[test]
fn empty_scene_yields_empty_sampled_directory() {
    let root = tempfile::tempdir().unwrap();
    let mut source = SyntheticSource::new(0);

    let summary =
        extract_frames(&mut source, root.path(), "scene.MP4", true, &ExtractOptions::new())
            .unwrap();

    let sampling = summary.sampling.unwrap();
    assert_eq!(sampling.sampled, 0);
    assert!(sampling.sampled_directory.is_dir());
    assert!(file_names(&sampling.sampled_directory).is_empty());
    assert!(!root.path().join("scene").exists());
}
