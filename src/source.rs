//! Video sources.
//!
//! A [`VideoSource`] yields decoded frames in decode order until the stream is
//! exhausted. Sources are not shared: every job opens its own through an
//! [`OpenSource`] implementation on the worker that runs it, and owns the
//! handle until the job ends.
//!
//! [`FfmpegSource`] is the production implementation. Tests and benchmarks
//! substitute in-memory sources through the same traits.
//!
//! # Example
//!
//! ```no_run
//! use vidprep::{FfmpegSource, VideoSource};
//!
//! let mut source = FfmpegSource::open("videos/ladder/left.MP4")?;
//! println!("{} frames reported", source.frame_count());
//! while let Some(frame) = source.next_frame()? {
//!     println!("{}x{}", frame.width(), frame.height());
//! }
//! # Ok::<(), vidprep::PrepError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{error::PrepError, utilities};

/// Consecutive unreadable packets tolerated before decoding gives up.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 64;

/// A stream of decoded frames.
pub trait VideoSource {
    /// Total frame count as reported by the container.
    ///
    /// Informational only: it feeds progress reporting and may differ from
    /// the number of frames [`next_frame`](VideoSource::next_frame) yields.
    fn frame_count(&self) -> u64;

    /// Decode the next frame, or `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, PrepError>;
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn frame_count(&self) -> u64 {
        (**self).frame_count()
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, PrepError> {
        (**self).next_frame()
    }
}

/// Opens a [`VideoSource`] for a path.
///
/// Shared by every worker of a run, hence [`Sync`].
pub trait OpenSource: Sync {
    /// The source type produced.
    type Source: VideoSource;

    /// Open `path`.
    ///
    /// # Errors
    ///
    /// [`PrepError::SourceOpen`] (or [`PrepError::NoVideoStream`]) when the
    /// file cannot be used at all.
    fn open(&self, path: &Path) -> Result<Self::Source, PrepError>;
}

/// Opens files with FFmpeg.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegOpener;

impl OpenSource for FfmpegOpener {
    type Source = FfmpegSource;

    fn open(&self, path: &Path) -> Result<FfmpegSource, PrepError> {
        FfmpegSource::open(path)
    }
}

/// Sequential FFmpeg decoder over the best video stream of a file.
///
/// Frames are converted to 8-bit RGB at their native resolution.
pub struct FfmpegSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    frame_count: u64,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    eof_sent: bool,
    path: PathBuf,
}

impl Debug for FfmpegSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegSource")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("frame_count", &self.frame_count)
            .field("eof_sent", &self.eof_sent)
            .finish_non_exhaustive()
    }
}

impl FfmpegSource {
    /// Open a video file for sequential decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, and prepares a
    /// decoder for its best video stream.
    ///
    /// # Errors
    ///
    /// [`PrepError::SourceOpen`] if the file cannot be opened or its codec
    /// is unusable, [`PrepError::NoVideoStream`] if it has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PrepError> {
        let path = path.as_ref().to_path_buf();

        log::debug!("Opening video source: {}", path.display());

        ffmpeg_next::init().map_err(|error| PrepError::SourceOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| PrepError::SourceOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| PrepError::NoVideoStream { path: path.clone() })?;
        let video_stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| PrepError::SourceOpen {
                path: path.clone(),
                reason: format!(
                    "Failed to create video decoder for stream {video_stream_index}: {error}"
                ),
            })?;

        let frame_count = match stream.frames() {
            frames if frames > 0 => frames as u64,
            _ => {
                let duration_microseconds = input_context.duration();
                let duration = if duration_microseconds > 0 {
                    Duration::from_micros(duration_microseconds as u64)
                } else {
                    Duration::ZERO
                };
                utilities::estimate_frame_count(
                    duration,
                    utilities::rational_to_fps(stream.avg_frame_rate()),
                )
            }
        };

        log::debug!(
            "Opened {} (stream={}, frames={})",
            path.display(),
            video_stream_index,
            frame_count,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            frame_count,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            eof_sent: false,
            path,
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Convert the current `decoded_frame` to an RGB image.
    ///
    /// The scaler is built from the first frame and rebuilt whenever the
    /// stream changes format or resolution mid-way.
    fn convert_current_frame(&mut self) -> Result<DynamicImage, PrepError> {
        let format = self.decoded_frame.format();
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            let input = scaler.input();
            input.format != format || input.width != width || input.height != height
        });
        if stale {
            self.scaler = Some(ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?);
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded_frame, &mut self.scaled_frame)?;
        }

        let buffer = utilities::frame_to_buffer(&self.scaled_frame, width, height, 3);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            PrepError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

impl VideoSource for FfmpegSource {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, PrepError> {
        let mut read_errors = 0;

        loop {
            // Drain frames the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return self.convert_current_frame().map(Some);
            }

            if self.eof_sent {
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    read_errors = 0;
                    if packet.stream() == self.video_stream_index {
                        self.decoder.send_packet(&packet).map_err(|error| {
                            PrepError::VideoDecodeError(format!(
                                "{}: {error}",
                                self.path.display()
                            ))
                        })?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    read_errors += 1;
                    log::warn!(
                        "Skipping unreadable packet in {}: {error}",
                        self.path.display()
                    );
                    if read_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        return Err(PrepError::VideoDecodeError(format!(
                            "{}: {read_errors} consecutive packet read failures",
                            self.path.display()
                        )));
                    }
                }
            }
        }
    }
}
