//! Output directory layout.
//!
//! Downstream consumers expect this exact layout, so every path the crate
//! writes is built here:
//!
//! ```text
//! {output_root}/{basename}/{basename}_{index:05}.jpg
//! {output_root}/sampled_{basename}/{basename}_{index:05}.jpg
//! ```
//!
//! The fixed-width index makes lexicographic filename order equal to decode
//! order for up to 100 000 frames.

use std::path::{Path, PathBuf};

use crate::error::PrepError;

/// Extension of every written frame file.
pub const FRAME_EXTENSION: &str = "jpg";

/// Prefix of the scene sampling directory.
pub const SAMPLED_PREFIX: &str = "sampled_";

/// The source file name without its extension.
///
/// # Errors
///
/// [`PrepError::InvalidSourcePath`] when the path has no file name.
///
/// # Example
///
/// ```
/// assert_eq!(vidprep::layout::basename("videos/ladder/scene.MP4").unwrap(), "scene");
/// ```
pub fn basename<P: AsRef<Path>>(source_path: P) -> Result<String, PrepError> {
    let source_path = source_path.as_ref();
    source_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| PrepError::InvalidSourcePath(source_path.to_path_buf()))
}

/// `{basename}_{index:05}.jpg`
pub fn frame_file_name(basename: &str, index: u64) -> String {
    format!("{basename}_{index:05}.{FRAME_EXTENSION}")
}

/// `{output_root}/{basename}`
pub fn frame_directory(output_root: &Path, basename: &str) -> PathBuf {
    output_root.join(basename)
}

/// `{output_root}/sampled_{basename}`
pub fn sampled_directory(output_root: &Path, basename: &str) -> PathBuf {
    output_root.join(format!("{SAMPLED_PREFIX}{basename}"))
}

/// Returns `true` if the file name ends in `.jpg`, a bare `.jpg` included.
pub fn is_frame_file(path: &Path) -> bool {
    path.file_name().is_some_and(|name| {
        name.as_encoded_bytes()
            .strip_suffix(FRAME_EXTENSION.as_bytes())
            .is_some_and(|stem| stem.ends_with(b"."))
    })
}
