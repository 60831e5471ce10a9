//! Frame extraction.
//!
//! [`extract_frames`] decodes a [`VideoSource`] to the end and writes every
//! frame as a JPEG into `{output_root}/{basename}/`. For the scene video it
//! then hands the finished directory to
//! [`sample_scene_frames`](crate::sample_scene_frames).
//!
//! # Example
//!
//! ```no_run
//! use vidprep::{ExtractOptions, FfmpegSource, extract_frames};
//!
//! let path = "videos/ladder/left.MP4";
//! let mut source = FfmpegSource::open(path)?;
//! let summary = extract_frames(&mut source, "preprocessed", path, false, &ExtractOptions::new())?;
//! println!("{} frames written to {}", summary.frames_written, summary.directory.display());
//! # Ok::<(), vidprep::PrepError>(())
//! ```

use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::{
    config::ExtractOptions,
    error::PrepError,
    layout,
    progress::{OperationType, ProgressTracker},
    sample::{SamplingSummary, sample_scene_frames},
    source::VideoSource,
};

/// What one extraction produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Source filename without extension.
    pub basename: String,
    /// `{output_root}/{basename}`. Removed again for a successfully
    /// sampled scene video.
    pub directory: PathBuf,
    /// Number of frames decoded and written.
    pub frames_written: u64,
    /// Frame count the source reported up front.
    pub frames_reported: u64,
    /// Present for the scene video only.
    pub sampling: Option<SamplingSummary>,
}

/// Decode `source` to the end, writing `{basename}_{index:05}.jpg` files.
///
/// `source_path` only names the output; the frames come from `source`. A
/// source that yields no frames leaves an empty directory behind and is not
/// an error. When `is_scene` is set the directory is sampled afterwards.
///
/// # Errors
///
/// Invalid options, a source path without a file name, decode failures, and
/// any failure to create the directory or write a frame. A write failure
/// aborts the extraction at that frame.
pub fn extract_frames<S, P, Q>(
    source: &mut S,
    output_root: P,
    source_path: Q,
    is_scene: bool,
    options: &ExtractOptions,
) -> Result<ExtractionSummary, PrepError>
where
    S: VideoSource + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    options.validate()?;

    let output_root = output_root.as_ref();
    let basename = layout::basename(source_path)?;
    let directory = layout::frame_directory(output_root, &basename);
    fs::create_dir_all(&directory)?;

    let frames_reported = source.frame_count();
    log::info!(
        "Extracting frames from {basename} ({frames_reported} reported) into {}",
        directory.display()
    );

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::FrameExtraction,
        &basename,
        Some(frames_reported),
        options.batch_size,
    );

    let mut index: u64 = 0;
    while let Some(frame) = source.next_frame()? {
        let path = directory.join(layout::frame_file_name(&basename, index));
        write_frame(&frame, &path, options.jpeg_quality).map_err(|error| {
            PrepError::FrameWrite {
                path: path.clone(),
                index,
                reason: error.to_string(),
            }
        })?;
        index += 1;
        tracker.advance();
    }
    tracker.finish();

    if index != frames_reported {
        log::debug!("{basename}: decoded {index} frames, container reported {frames_reported}");
    }

    let sampling = if is_scene {
        Some(sample_scene_frames(
            output_root,
            &directory,
            &basename,
            options,
        )?)
    } else {
        None
    };

    Ok(ExtractionSummary {
        basename,
        directory,
        frames_written: index,
        frames_reported,
        sampling,
    })
}

/// Encode `frame` as a JPEG at `quality` and write it to `path`.
///
/// The image is encoded in memory first so that a failed write surfaces as
/// an error rather than being lost when a buffered writer is dropped.
///
/// # Errors
///
/// [`PrepError::ImageError`] if encoding fails, [`PrepError::IoError`] if the
/// file cannot be written.
pub fn write_frame(frame: &DynamicImage, path: &Path, quality: u8) -> Result<(), PrepError> {
    let rgb = match frame {
        DynamicImage::ImageRgb8(buffer) => Cow::Borrowed(buffer),
        other => Cow::Owned(other.to_rgb8()),
    };

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&*rgb)?;
    fs::write(path, &bytes)?;
    Ok(())
}
