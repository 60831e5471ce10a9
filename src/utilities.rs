//! Internal utility functions.
//!
//! Helpers for pixel-data copying and frame-count estimation that do not
//! belong in any single public module.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// `bytes_per_pixel` is the number of bytes per pixel for the output format
/// (3 for the RGB24 frames the decoder produces).
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    pack_rows(
        video_frame.data(0),
        video_frame.stride(0),
        (width as usize) * bytes_per_pixel,
        height as usize,
    )
}

/// Drop the per-row padding of a strided plane.
fn pack_rows(data: &[u8], stride: usize, row_length: usize, rows: usize) -> Vec<u8> {
    if stride == row_length {
        return data[..row_length * rows].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_length * rows);
    for row in 0..rows {
        let row_start = row * stride;
        buffer.extend_from_slice(&data[row_start..row_start + row_length]);
    }
    buffer
}

/// Frames per second from a stream rate, or `0.0` for an unset rate.
pub(crate) fn rational_to_fps(rate: Rational) -> f64 {
    if rate.denominator() != 0 && rate.numerator() > 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        0.0
    }
}

/// Estimate a frame count from duration and frame rate, for containers that
/// do not record one.
pub(crate) fn estimate_frame_count(duration: Duration, frames_per_second: f64) -> u64 {
    if frames_per_second > 0.0 {
        (duration.as_secs_f64() * frames_per_second).round() as u64
    } else {
        0
    }
}
