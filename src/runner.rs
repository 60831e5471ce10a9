//! Concurrent job execution.
//!
//! A run is a list of [`Job`] descriptors, one per active camera. The
//! [`JobRunner`] executes them on a fixed-size [`rayon`] thread pool. Each
//! worker opens its own [`VideoSource`](crate::VideoSource) and writes to
//! its own directory subtree, so jobs share no mutable state.
//!
//! Jobs never cancel one another: every job runs to completion or failure
//! and the [`RunReport`] carries all outcomes once the whole run has settled.
//!
//! # Example
//!
//! ```no_run
//! use vidprep::{Camera, ExtractOptions, FfmpegOpener, RunConfig, preprocess};
//!
//! let config = RunConfig::default().with_active(vec![Camera::Scene, Camera::Camera2]);
//! let report = preprocess(&config, &ExtractOptions::new(), &FfmpegOpener)?;
//! for failure in report.failures() {
//!     eprintln!("{} failed", failure.job.camera);
//! }
//! report.ensure_success()?;
//! # Ok::<(), vidprep::PrepError>(())
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    time::{Duration, Instant},
};

use rayon::{
    ThreadPool, ThreadPoolBuilder,
    iter::{IntoParallelIterator, ParallelIterator},
};

use crate::{
    config::{Camera, ExtractOptions, RunConfig},
    error::PrepError,
    extract::{ExtractionSummary, extract_frames},
    layout,
    source::OpenSource,
};

/// One unit of work: extract one video, and sample it if it is the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Which configured source this job processes.
    pub camera: Camera,
    /// Video file to decode. Its file stem names the output.
    pub source_path: PathBuf,
    /// Root directory the job writes under.
    pub output_root: PathBuf,
    /// Sample the extracted frames afterwards.
    pub is_scene: bool,
}

impl Job {
    /// Open the source and extract it.
    ///
    /// # Errors
    ///
    /// Whatever opening or extraction returns; an open failure is reported
    /// as [`PrepError::SourceOpen`], not as an empty video.
    pub fn run<O: OpenSource + ?Sized>(
        &self,
        opener: &O,
        options: &ExtractOptions,
    ) -> Result<ExtractionSummary, PrepError> {
        let mut source = opener.open(&self.source_path)?;
        extract_frames(
            &mut source,
            &self.output_root,
            &self.source_path,
            self.is_scene,
            options,
        )
    }
}

/// How one job ended.
#[derive(Debug)]
pub struct JobOutcome {
    /// The job that ran.
    pub job: Job,
    /// Its summary, or the error that stopped it.
    pub result: Result<ExtractionSummary, PrepError>,
    /// Wall-clock time the job took.
    pub elapsed: Duration,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// All outcomes of a run, in job order.
#[derive(Debug)]
#[must_use]
pub struct RunReport {
    /// One entry per submitted job.
    pub outcomes: Vec<JobOutcome>,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

impl RunReport {
    /// Outcomes whose job failed.
    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    /// Returns `true` if every job succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(JobOutcome::is_success)
    }

    /// Fail if any job failed.
    ///
    /// # Errors
    ///
    /// [`PrepError::JobsFailed`] with the failure count.
    pub fn ensure_success(&self) -> Result<(), PrepError> {
        let failed = self.failures().count();
        if failed == 0 {
            Ok(())
        } else {
            Err(PrepError::JobsFailed {
                failed,
                total: self.outcomes.len(),
            })
        }
    }
}

/// Runs jobs on a bounded worker pool.
pub struct JobRunner {
    pool: ThreadPool,
    options: ExtractOptions,
}

impl JobRunner {
    /// Create a runner with `workers` threads.
    ///
    /// # Errors
    ///
    /// [`PrepError::InvalidWorkerCount`] for zero workers, option validation
    /// errors, and [`PrepError::WorkerPool`] if the threads cannot be spawned.
    pub fn new(options: ExtractOptions, workers: usize) -> Result<Self, PrepError> {
        if workers == 0 {
            return Err(PrepError::InvalidWorkerCount);
        }
        options.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("vidprep-worker-{index}"))
            .build()
            .map_err(|error| PrepError::WorkerPool(error.to_string()))?;

        Ok(Self { pool, options })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every job and wait for all of them to settle.
    pub fn run<O: OpenSource>(&self, jobs: Vec<Job>, opener: &O) -> RunReport {
        let start = Instant::now();
        log::info!(
            "Running {} job(s) on {} worker(s)",
            jobs.len(),
            self.workers()
        );

        let outcomes: Vec<JobOutcome> = self.pool.install(|| {
            jobs.into_par_iter()
                .map(|job| self.run_job(job, opener))
                .collect()
        });

        RunReport {
            outcomes,
            elapsed: start.elapsed(),
        }
    }

    fn run_job<O: OpenSource>(&self, job: Job, opener: &O) -> JobOutcome {
        let start = Instant::now();
        log::debug!("{}: starting {}", job.camera, job.source_path.display());

        let result = job.run(opener, &self.options);
        let elapsed = start.elapsed();

        match &result {
            Ok(summary) => log::info!(
                "{}: wrote {} frames in {:.2?}",
                job.camera,
                summary.frames_written,
                elapsed
            ),
            Err(error) => log::warn!("{}: failed after {:.2?}: {error}", job.camera, elapsed),
        }

        JobOutcome {
            job,
            result,
            elapsed,
        }
    }
}

/// Check that no two jobs write into the same directory.
///
/// Every job owns `{output_root}/{basename}`; the scene job also owns
/// `{output_root}/sampled_{basename}`. Jobs whose source path has no basename
/// are skipped here and fail on their own when run.
///
/// # Errors
///
/// [`PrepError::DuplicateBasename`] naming the first contested directory.
pub fn check_distinct_outputs(jobs: &[Job]) -> Result<(), PrepError> {
    let mut owners: BTreeMap<(PathBuf, String), Vec<Camera>> = BTreeMap::new();
    for job in jobs {
        let Ok(basename) = layout::basename(&job.source_path) else {
            continue;
        };
        if job.is_scene {
            let sampled = format!("{}{basename}", layout::SAMPLED_PREFIX);
            owners
                .entry((job.output_root.clone(), sampled))
                .or_default()
                .push(job.camera);
        }
        owners
            .entry((job.output_root.clone(), basename))
            .or_default()
            .push(job.camera);
    }

    match owners.into_iter().find(|(_, cameras)| cameras.len() > 1) {
        Some(((_, basename), cameras)) => {
            Err(PrepError::DuplicateBasename { basename, cameras })
        }
        None => Ok(()),
    }
}

/// Run the whole configured preprocessing pass.
///
/// Turns the active cameras into jobs, refuses job sets that would share an
/// output directory, creates the output root, and runs the jobs on a pool
/// sized by [`RunConfig::worker_count`]. Job failures are in the report; only
/// setup problems are returned as errors.
///
/// # Errors
///
/// [`PrepError::DuplicateBasename`], failure to create the output root, an
/// invalid worker count or options, or a pool that cannot be built.
pub fn preprocess<O: OpenSource>(
    config: &RunConfig,
    options: &ExtractOptions,
    opener: &O,
) -> Result<RunReport, PrepError> {
    let start = Instant::now();
    let jobs = config.jobs();
    check_distinct_outputs(&jobs)?;
    fs::create_dir_all(&config.output)?;

    let runner = JobRunner::new(options.clone(), config.worker_count()?)?;
    let mut report = runner.run(jobs, opener);
    report.elapsed = start.elapsed();
    Ok(report)
}
