//! FFmpeg log level configuration.
//!
//! FFmpeg prints its own warnings to stderr, separately from the Rust
//! [`log`](https://crates.io/crates/log) facade. With several decoders
//! running at once that output interleaves with progress bars, so a run
//! keeps FFmpeg at [`FfmpegLogLevel::for_run`] unless told otherwise.
//!
//! # Example
//!
//! ```no_run
//! use vidprep::FfmpegLogLevel;
//!
//! let level: FfmpegLogLevel = "warn".parse().unwrap_or(FfmpegLogLevel::for_run(false));
//! vidprep::set_ffmpeg_log_level(level);
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity level, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    /// FFmpeg's own default.
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl FfmpegLogLevel {
    /// Every level, most quiet first.
    pub const ALL: [FfmpegLogLevel; 9] = [
        FfmpegLogLevel::Quiet,
        FfmpegLogLevel::Panic,
        FfmpegLogLevel::Fatal,
        FfmpegLogLevel::Error,
        FfmpegLogLevel::Warning,
        FfmpegLogLevel::Info,
        FfmpegLogLevel::Verbose,
        FfmpegLogLevel::Debug,
        FfmpegLogLevel::Trace,
    ];

    /// The level a run uses when none is given.
    ///
    /// Decoder warnings about damaged packets are only worth seeing in a
    /// verbose run; otherwise FFmpeg reports errors only.
    pub fn for_run(verbose: bool) -> Self {
        if verbose {
            FfmpegLogLevel::Warning
        } else {
            FfmpegLogLevel::Error
        }
    }

    /// Lowercase name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            FfmpegLogLevel::Quiet => "quiet",
            FfmpegLogLevel::Panic => "panic",
            FfmpegLogLevel::Fatal => "fatal",
            FfmpegLogLevel::Error => "error",
            FfmpegLogLevel::Warning => "warning",
            FfmpegLogLevel::Info => "info",
            FfmpegLogLevel::Verbose => "verbose",
            FfmpegLogLevel::Debug => "debug",
            FfmpegLogLevel::Trace => "trace",
        }
    }

    fn level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        let canonical = match value.as_str() {
            "off" => "quiet",
            "warn" => "warning",
            other => other,
        };
        FfmpegLogLevel::ALL
            .into_iter()
            .find(|level| level.name() == canonical)
            .ok_or_else(|| format!("unsupported FFmpeg log level: {value}"))
    }
}

/// Set what FFmpeg itself prints. Does not affect `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    log::debug!("FFmpeg log level set to {level}");
    ffmpeg_next::util::log::set_level(level.level());
}

/// The current FFmpeg log level, or `None` if FFmpeg reports one with no
/// matching variant.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    let level = match ffmpeg_next::util::log::get_level().ok()? {
        Level::Quiet => FfmpegLogLevel::Quiet,
        Level::Panic => FfmpegLogLevel::Panic,
        Level::Fatal => FfmpegLogLevel::Fatal,
        Level::Error => FfmpegLogLevel::Error,
        Level::Warning => FfmpegLogLevel::Warning,
        Level::Info => FfmpegLogLevel::Info,
        Level::Verbose => FfmpegLogLevel::Verbose,
        Level::Debug => FfmpegLogLevel::Debug,
        Level::Trace => FfmpegLogLevel::Trace,
    };
    Some(level)
}
