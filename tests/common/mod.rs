//! In-memory video sources shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    thread,
    time::Duration,
};

use image::{DynamicImage, Rgb, RgbImage};
use vidprep::{OpenSource, PrepError, ProgressCallback, ProgressInfo, VideoSource};

pub const WIDTH: u32 = 32;
pub const HEIGHT: u32 = 24;

/// Yields `frames` generated images, optionally sleeping before each one.
pub struct SyntheticSource {
    pub frames: u64,
    pub reported: u64,
    pub delay: Duration,
    next: u64,
}

impl SyntheticSource {
    pub fn new(frames: u64) -> Self {
        Self {
            frames,
            reported: frames,
            delay: Duration::ZERO,
            next: 0,
        }
    }

    pub fn with_reported(mut self, reported: u64) -> Self {
        self.reported = reported;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl VideoSource for SyntheticSource {
    fn frame_count(&self) -> u64 {
        self.reported
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, PrepError> {
        if self.next >= self.frames {
            return Ok(None);
        }
        thread::sleep(self.delay);
        let image = synthetic_frame(self.next);
        self.next += 1;
        Ok(Some(image))
    }
}

/// A frame whose content depends on its index.
pub fn synthetic_frame(index: u64) -> DynamicImage {
    let shade = (index % 256) as u8;
    DynamicImage::ImageRgb8(RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        Rgb([shade, (x * 8) as u8, (y * 10) as u8])
    }))
}

/// Opens synthetic sources by path. Unknown paths fail like a missing file.
#[derive(Default)]
pub struct SyntheticOpener {
    sources: HashMap<PathBuf, (u64, Duration)>,
    pub opened: Mutex<Vec<PathBuf>>,
}

impl SyntheticOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video<P: Into<PathBuf>>(mut self, path: P, frames: u64) -> Self {
        self.sources.insert(path.into(), (frames, Duration::ZERO));
        self
    }

    pub fn with_slow_video<P: Into<PathBuf>>(mut self, path: P, frames: u64, delay: Duration) -> Self {
        self.sources.insert(path.into(), (frames, delay));
        self
    }
}

impl OpenSource for SyntheticOpener {
    type Source = SyntheticSource;

    fn open(&self, path: &Path) -> Result<SyntheticSource, PrepError> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        match self.sources.get(path) {
            Some(&(frames, delay)) => Ok(SyntheticSource::new(frames).with_delay(delay)),
            None => Err(PrepError::SourceOpen {
                path: path.to_path_buf(),
                reason: "No such file or directory".to_string(),
            }),
        }
    }
}

/// Records every progress notification.
#[derive(Default)]
pub struct RecordingProgress {
    pub infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

/// Sorted file names in `directory`.
pub fn file_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Write `count` small fake frame files named like extracted frames.
pub fn write_fake_frames(directory: &Path, basename: &str, count: u64) {
    fs::create_dir_all(directory).unwrap();
    for index in 0..count {
        let name = vidprep::layout::frame_file_name(basename, index);
        fs::write(directory.join(name), format!("frame-{index}-{}", "x".repeat(index as usize)))
            .unwrap();
    }
}
