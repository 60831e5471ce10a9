//! # vidprep
//!
//! Preprocess multi-camera video captures into frame datasets.
//!
//! A capture consists of one static "scene" camera and several moving
//! cameras. `vidprep` decodes each video with FFmpeg (via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate) and writes
//! every frame as a low-quality JPEG:
//!
//! ```text
//! preprocessed/
//! ├── head/head_00000.jpg, head_00001.jpg, …
//! ├── left/left_00000.jpg, …
//! └── sampled_scene/scene_00004.jpg, scene_00009.jpg, …
//! ```
//!
//! The scene video is additionally sampled: every fifth frame is copied to
//! `sampled_{basename}/` and the full frame directory is removed, but only
//! once the copies are verified.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidprep::{Camera, ExtractOptions, FfmpegOpener, RunConfig, preprocess};
//!
//! let config = RunConfig::default()
//!     .with_output("preprocessed")
//!     .with_active(vec![Camera::Scene, Camera::Camera1]);
//!
//! let report = preprocess(&config, &ExtractOptions::new(), &FfmpegOpener)?;
//! println!("took {:?}", report.elapsed);
//! report.ensure_success()?;
//! # Ok::<(), vidprep::PrepError>(())
//! ```
//!
//! Individual videos can be processed without the runner through
//! [`extract_frames`] and [`sample_scene_frames`]. Both take any
//! [`VideoSource`], so in-memory sources work as well as files.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod config;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod layout;
pub mod progress;
pub mod runner;
pub mod sample;
pub mod source;
mod utilities;

pub use config::{
    Camera, DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_DIRECTORY, DEFAULT_SAMPLING_STRIDE,
    ExtractOptions, RunConfig,
};
pub use error::PrepError;
pub use extract::{ExtractionSummary, extract_frames, write_frame};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use runner::{Job, JobOutcome, JobRunner, RunReport, check_distinct_outputs, preprocess};
pub use sample::{SamplingSummary, sample_scene_frames};
pub use source::{FfmpegOpener, FfmpegSource, OpenSource, VideoSource};
