//! Scene frame sampling.
//!
//! The static scene camera produces far more near-identical frames than
//! downstream reconstruction needs. [`sample_scene_frames`] keeps every Nth
//! frame (by sorted filename, so by decode order) in
//! `{output_root}/sampled_{basename}/` and then removes the full frame
//! directory.
//!
//! The original directory is only removed once every selected file has been
//! copied and verified. Any failure leaves it untouched.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::ExtractOptions,
    error::PrepError,
    layout,
    progress::{OperationType, ProgressTracker},
};

/// Result of sampling one scene directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingSummary {
    /// `{output_root}/sampled_{basename}`.
    pub sampled_directory: PathBuf,
    /// Frame files this run copied into the sampled directory.
    pub sampled: usize,
    /// Frame files that were in the original directory.
    pub original: usize,
}

/// Copy every `stride`-th frame file into the sampled directory, then delete
/// `frame_directory`.
///
/// Positions are counted from 1 over the lexicographically sorted `.jpg`
/// files, so with a stride of 5 the files at positions 5, 10, 15, … are
/// kept. Bytes are copied verbatim. Fewer files than the stride yields an
/// empty sampled directory, and the original is still removed.
///
/// # Errors
///
/// [`PrepError::InvalidStride`] for a zero stride, [`PrepError::IoError`] for
/// any listing, copy, or removal failure, and
/// [`PrepError::SamplingIncomplete`] if the copies cannot be verified. In
/// every error case except a failed removal, `frame_directory` still exists.
pub fn sample_scene_frames(
    output_root: &Path,
    frame_directory: &Path,
    basename: &str,
    options: &ExtractOptions,
) -> Result<SamplingSummary, PrepError> {
    let stride = options.sampling_stride;
    if stride == 0 {
        return Err(PrepError::InvalidStride);
    }

    let image_files = list_frame_files(frame_directory)?;
    let sampled_directory = layout::sampled_directory(output_root, basename);
    fs::create_dir_all(&sampled_directory)?;

    log::debug!(
        "Sampling every {stride}th of {} frames from {} into {}",
        image_files.len(),
        frame_directory.display(),
        sampled_directory.display(),
    );

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::SceneSampling,
        basename,
        Some(image_files.len() as u64),
        options.batch_size,
    );

    let mut selected = Vec::with_capacity(image_files.len() / stride);
    for (position, file_name) in image_files.iter().enumerate() {
        if (position + 1) % stride == 0 {
            fs::copy(
                frame_directory.join(file_name),
                sampled_directory.join(file_name),
            )?;
            selected.push(file_name);
        }
        tracker.advance();
    }
    tracker.finish();

    let verified = selected
        .iter()
        .filter(|file_name| {
            same_length(
                &frame_directory.join(file_name),
                &sampled_directory.join(file_name),
            )
        })
        .count();
    let expected = image_files.len() / stride;
    if verified != expected {
        return Err(PrepError::SamplingIncomplete {
            directory: frame_directory.to_path_buf(),
            expected,
            copied: verified,
        });
    }

    let sampled = selected.len();
    let original = image_files.len();
    log::info!("{sampled} scene images sampled out of {original} original images.");

    fs::remove_dir_all(frame_directory)?;
    log::debug!("Removed {}", frame_directory.display());

    Ok(SamplingSummary {
        sampled_directory,
        sampled,
        original,
    })
}

/// Names of the `.jpg` files in `directory`, sorted.
fn list_frame_files(directory: &Path) -> Result<Vec<OsString>, PrepError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_file() && layout::is_frame_file(&entry.path()) {
            names.push(entry.file_name());
        }
    }
    names.sort();
    Ok(names)
}

fn same_length(source: &Path, copy: &Path) -> bool {
    match (fs::metadata(source), fs::metadata(copy)) {
        (Ok(source), Ok(copy)) => copy.is_file() && source.len() == copy.len(),
        _ => false,
    }
}
