use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use clap::Parser;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use vidprep::{
    Camera, DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_DIRECTORY, DEFAULT_SAMPLING_STRIDE,
    ExtractOptions, FfmpegLogLevel, FfmpegOpener, OperationType, ProgressCallback, ProgressInfo,
    RunConfig, RunReport,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidprep --scene videos/ladder/scene.MP4 --camera_1 videos/ladder/head.MP4 --output preprocessed\n  vidprep --active scene,camera_2 --workers 2\n  vidprep --active camera_3 --quality 40 --verbose";

const BANNER: &str = "-------------------------Preprocessing video data-------------------------";

#[derive(Debug, Parser)]
#[command(
    name = "vidprep",
    version,
    about = "Extract frames from multi-camera videos and sample the static scene video",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Static scene video file.
    #[arg(long, default_value = "videos/ladder/scene.MP4")]
    scene: PathBuf,

    /// Video file of a moving camera in the scene.
    #[arg(long = "camera_1", default_value = "videos/ladder/head.MP4")]
    camera_1: PathBuf,

    /// Video file of a moving camera in the scene.
    #[arg(long = "camera_2", default_value = "videos/ladder/left.MP4")]
    camera_2: PathBuf,

    /// Video file of a moving camera in the scene.
    #[arg(long = "camera_3", default_value = "videos/ladder/right.MP4")]
    camera_3: PathBuf,

    /// Output directory of processed frames.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIRECTORY)]
    output: PathBuf,

    /// Cameras to process (scene, camera_1, camera_2, camera_3). Defaults to all.
    #[arg(long, value_delimiter = ',')]
    active: Vec<Camera>,

    /// Worker thread count. Defaults to the available parallelism.
    #[arg(long)]
    workers: Option<usize>,

    /// JPEG quality of written frames (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// Keep every Nth scene frame.
    #[arg(long, default_value_t = DEFAULT_SAMPLING_STRIDE)]
    stride: usize,

    /// Show debug logging.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    /// Defaults to error, or warning with --verbose.
    #[arg(long)]
    ffmpeg_log_level: Option<FfmpegLogLevel>,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let active = if self.active.is_empty() {
            Camera::ALL.to_vec()
        } else {
            self.active.clone()
        };

        RunConfig {
            scene: self.scene.clone(),
            camera_1: self.camera_1.clone(),
            camera_2: self.camera_2.clone(),
            camera_3: self.camera_3.clone(),
            output: self.output.clone(),
            active,
            workers: self.workers,
        }
    }

    fn ffmpeg_level(&self) -> FfmpegLogLevel {
        self.ffmpeg_log_level
            .unwrap_or(FfmpegLogLevel::for_run(self.verbose))
    }

    fn extract_options(&self, progress: Arc<dyn ProgressCallback>) -> ExtractOptions {
        ExtractOptions::new()
            .with_jpeg_quality(self.quality)
            .with_sampling_stride(self.stride)
            .with_progress(progress)
    }
}

/// One progress bar per job and operation.
struct TerminalProgress {
    bars: MultiProgress,
    style: ProgressStyle,
    active: Mutex<HashMap<String, ProgressBar>>,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let style = ProgressStyle::with_template(
            "{msg:<36} {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}<{eta_precise}]",
        )?
        .progress_chars("##-");

        Ok(Self {
            bars: MultiProgress::new(),
            style,
            active: Mutex::new(HashMap::new()),
        })
    }

    fn finish_all(&self) {
        if let Ok(active) = self.active.lock() {
            for bar in active.values() {
                bar.finish();
            }
        }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let Ok(mut active) = self.active.lock() else {
            return;
        };

        let message = match info.operation {
            OperationType::SceneSampling => format!("Sampling images of {}...", info.label),
            _ => format!("Extracting frames from {}...", info.label),
        };
        let bar = active
            .entry(format!("{:?}/{}", info.operation, info.label))
            .or_insert_with(|| {
                let bar = self.bars.add(ProgressBar::new(info.total.unwrap_or(0)));
                bar.set_style(self.style.clone());
                bar.set_message(message);
                bar
            });

        // The reported total is the container's estimate and can be short.
        bar.set_length(info.total.unwrap_or(0).max(info.current));
        bar.set_position(info.current);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .init();
}

fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        let camera = outcome.job.camera;
        match &outcome.result {
            Ok(summary) => {
                println!(
                    "{} {camera}: {} frames from {} in {:.2?}",
                    "done".green().bold(),
                    summary.frames_written,
                    outcome.job.source_path.display(),
                    outcome.elapsed,
                );
                if let Some(sampling) = &summary.sampling {
                    println!(
                        "{} scene images sampled out of {} original images.",
                        sampling.sampled, sampling.original
                    );
                }
            }
            Err(error) => {
                eprintln!("{} {camera}: {error}", "failed".red().bold());
            }
        }
    }

    println!(
        "Preprocess took {:.5} minutes",
        report.elapsed.as_secs_f64() / 60.0
    );
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    vidprep::set_ffmpeg_log_level(cli.ffmpeg_level());

    println!("{BANNER}");

    let progress = Arc::new(TerminalProgress::new()?);
    let config = cli.run_config();
    let options = cli.extract_options(progress.clone());

    let report = vidprep::preprocess(&config, &options, &FfmpegOpener)?;
    progress.finish_all();

    print_report(&report);
    report.ensure_success()?;
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
