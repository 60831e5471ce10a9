//! Extraction options and run configuration.
//!
//! [`ExtractOptions`] is a builder that threads the JPEG quality, sampling
//! stride, and progress callback through extraction and sampling without
//! polluting every function signature. [`RunConfig`] describes one whole run:
//! the four configured camera sources, the output root, and which of the
//! sources are active.
//!
//! # Example
//!
//! ```
//! use vidprep::{Camera, ExtractOptions, RunConfig};
//!
//! let options = ExtractOptions::new().with_jpeg_quality(40).with_sampling_stride(10);
//! assert_eq!(options.jpeg_quality(), 40);
//!
//! let config = RunConfig::default().with_active(vec![Camera::Scene, Camera::Camera2]);
//! assert_eq!(config.jobs().len(), 2);
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::PrepError;
use crate::progress::{NoOpProgress, ProgressCallback};
use crate::runner::Job;

/// JPEG quality used when none is configured. Favours size over fidelity.
pub const DEFAULT_JPEG_QUALITY: u8 = 20;

/// Every Nth extracted scene frame is kept.
pub const DEFAULT_SAMPLING_STRIDE: usize = 5;

/// Default root directory for all output.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "preprocessed";

/// Settings shared by extraction and sampling.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
    pub(crate) jpeg_quality: u8,
    pub(crate) sampling_stride: usize,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("batch_size", &self.batch_size)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("sampling_stride", &self.sampling_stride)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    ///
    /// Defaults: no progress callback, batch size 1, JPEG quality 20,
    /// sampling stride 5.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            sampling_stride: DEFAULT_SAMPLING_STRIDE,
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires.
    ///
    /// A value of 1 means every item; 10 means every 10th item.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the JPEG quality (1–100) used for every written frame.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Set the scene sampling stride.
    #[must_use]
    pub fn with_sampling_stride(mut self, stride: usize) -> Self {
        self.sampling_stride = stride;
        self
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub fn sampling_stride(&self) -> usize {
        self.sampling_stride
    }

    /// Check that quality and stride are usable.
    ///
    /// # Errors
    ///
    /// [`PrepError::InvalidQuality`] for a quality outside `1..=100` and
    /// [`PrepError::InvalidStride`] for a zero stride.
    pub fn validate(&self) -> Result<(), PrepError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PrepError::InvalidQuality(self.jpeg_quality));
        }
        if self.sampling_stride == 0 {
            return Err(PrepError::InvalidStride);
        }
        Ok(())
    }
}

/// One of the four configured capture sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Camera {
    /// The static scene camera. Its frames are sampled.
    Scene,
    /// First moving camera.
    Camera1,
    /// Second moving camera.
    Camera2,
    /// Third moving camera.
    Camera3,
}

impl Camera {
    /// All cameras in run order.
    pub const ALL: [Camera; 4] = [
        Camera::Scene,
        Camera::Camera1,
        Camera::Camera2,
        Camera::Camera3,
    ];

    /// Returns `true` for the scene camera.
    pub fn is_scene(self) -> bool {
        self == Camera::Scene
    }

    /// The name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Camera::Scene => "scene",
            Camera::Camera1 => "camera_1",
            Camera::Camera2 => "camera_2",
            Camera::Camera3 => "camera_3",
        }
    }
}

impl Display for Camera {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for Camera {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "scene" => Ok(Camera::Scene),
            "camera_1" | "camera1" | "1" => Ok(Camera::Camera1),
            "camera_2" | "camera2" | "2" => Ok(Camera::Camera2),
            "camera_3" | "camera3" | "3" => Ok(Camera::Camera3),
            other => Err(format!(
                "unknown camera '{other}' (expected scene, camera_1, camera_2, camera_3)"
            )),
        }
    }
}

/// Everything one run needs, built once at process start.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Static scene video.
    pub scene: PathBuf,
    /// First moving-camera video.
    pub camera_1: PathBuf,
    /// Second moving-camera video.
    pub camera_2: PathBuf,
    /// Third moving-camera video.
    pub camera_3: PathBuf,
    /// Root directory for all extracted and sampled output.
    pub output: PathBuf,
    /// Cameras that become jobs. Order and duplicates do not matter.
    pub active: Vec<Camera>,
    /// Worker pool size. `None` uses the host's available parallelism.
    pub workers: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scene: PathBuf::from("videos/ladder/scene.MP4"),
            camera_1: PathBuf::from("videos/ladder/head.MP4"),
            camera_2: PathBuf::from("videos/ladder/left.MP4"),
            camera_3: PathBuf::from("videos/ladder/right.MP4"),
            output: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            active: Camera::ALL.to_vec(),
            workers: None,
        }
    }
}

impl RunConfig {
    /// Replace the active camera selection.
    #[must_use]
    pub fn with_active(mut self, active: Vec<Camera>) -> Self {
        self.active = active;
        self
    }

    /// Set the output root.
    #[must_use]
    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }

    /// Set the path configured for a camera.
    #[must_use]
    pub fn with_source<P: Into<PathBuf>>(mut self, camera: Camera, path: P) -> Self {
        let path = path.into();
        match camera {
            Camera::Scene => self.scene = path,
            Camera::Camera1 => self.camera_1 = path,
            Camera::Camera2 => self.camera_2 = path,
            Camera::Camera3 => self.camera_3 = path,
        }
        self
    }

    /// Set a fixed worker pool size.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// The path configured for a camera.
    pub fn source(&self, camera: Camera) -> &Path {
        match camera {
            Camera::Scene => &self.scene,
            Camera::Camera1 => &self.camera_1,
            Camera::Camera2 => &self.camera_2,
            Camera::Camera3 => &self.camera_3,
        }
    }

    /// Job descriptors for the active cameras, in [`Camera::ALL`] order.
    pub fn jobs(&self) -> Vec<Job> {
        Camera::ALL
            .into_iter()
            .filter(|camera| self.active.contains(camera))
            .map(|camera| Job {
                camera,
                source_path: self.source(camera).to_path_buf(),
                output_root: self.output.clone(),
                is_scene: camera.is_scene(),
            })
            .collect()
    }

    /// Resolve the worker pool size.
    ///
    /// # Errors
    ///
    /// [`PrepError::InvalidWorkerCount`] if zero workers were requested.
    pub fn worker_count(&self) -> Result<usize, PrepError> {
        match self.workers {
            Some(0) => Err(PrepError::InvalidWorkerCount),
            Some(workers) => Ok(workers),
            None => Ok(std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)),
        }
    }
}
