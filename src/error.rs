//! Error types for the `vidprep` crate.
//!
//! This module defines [`PrepError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry the paths and frame indices
//! involved so a failed job can be diagnosed from its message alone.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

use crate::config::Camera;

/// The unified error type for all `vidprep` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PrepError {
    /// The video file could not be opened.
    ///
    /// Distinct from a video that opens fine but contains no frames, which
    /// is not an error.
    #[error("Failed to open video source at {path}: {reason}")]
    SourceOpen {
        /// Path that was passed to the opener.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened but does not contain a video stream.
    #[error("No video stream found in {path}")]
    NoVideoStream {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The source path has no file name to derive a basename from.
    #[error("Cannot derive a basename from source path {0}")]
    InvalidSourcePath(PathBuf),

    /// A frame could not be encoded or written to disk.
    #[error("Failed to write frame {index} to {path}: {reason}")]
    FrameWrite {
        /// Destination file.
        path: PathBuf,
        /// Zero-based frame index.
        index: u64,
        /// Underlying reason.
        reason: String,
    },

    /// The sampled directory does not hold the expected number of files.
    ///
    /// The original frame directory is left in place when this is returned.
    #[error(
        "Sampling of {directory} incomplete: expected {expected} sampled frames, found {copied}"
    )]
    SamplingIncomplete {
        /// The original frame directory.
        directory: PathBuf,
        /// Number of frames the stride selects.
        expected: usize,
        /// Number of files actually present in the sampled directory.
        copied: usize,
    },

    /// A sampling stride of zero was provided.
    #[error("Sampling stride must be greater than zero")]
    InvalidStride,

    /// A JPEG quality outside `1..=100` was provided.
    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    /// A worker count of zero was provided.
    #[error("Worker count must be greater than zero")]
    InvalidWorkerCount,

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    /// Two active jobs would write into the same output directory.
    ///
    /// Returned before any job starts, so nothing has been written.
    #[error("Output directory {basename:?} would be shared by {cameras:?}")]
    DuplicateBasename {
        /// The contested directory name under the output root.
        basename: String,
        /// Cameras whose output maps to it, in job order.
        cameras: Vec<Camera>,
    },

    /// One or more jobs of a run failed.
    #[error("{failed} of {total} jobs failed")]
    JobsFailed {
        /// Number of failed jobs.
        failed: usize,
        /// Number of jobs in the run.
        total: usize,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for PrepError {
    fn from(error: FfmpegError) -> Self {
        PrepError::FfmpegError(error.to_string())
    }
}
