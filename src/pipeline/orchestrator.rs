//! Pipeline orchestration
//!
//! Coordinates discovery, the worker pool and the run summary. Workers are
//! long-lived tasks on a dedicated rayon pool, fed through a crossbeam job
//! channel; outcomes come back on an unbounded result channel.

use super::worker::{Worker, WorkerContext};
use super::JobOutcome;
use crate::analysis::{DefaultOracleFactory, OracleFactory};
use crate::audio::{FfmpegTranscoder, Transcoder};
use crate::config::Settings;
use crate::discovery::{self, DiscoveredFile};
use crate::error::{BeatprefixError, Result};
use crossbeam_channel::unbounded;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Pipeline result summary
#[derive(Debug, Default)]
pub struct PipelineResult {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    /// One entry per processed file, in completion order
    pub outcomes: Vec<JobOutcome>,
}

impl PipelineResult {
    fn from_outcomes(total_files: usize, outcomes: Vec<JobOutcome>) -> Self {
        let successful = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total_files,
            successful,
            failed: outcomes.len() - successful,
            outcomes,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Failed files with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &BeatprefixError)> {
        self.outcomes.iter().filter_map(|o| match o {
            JobOutcome::Failed { path, error } => Some((path.as_path(), error)),
            JobOutcome::Committed { .. } => None,
        })
    }
}

/// Run the full pipeline with the production oracles and system ffmpeg
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    settings.validate()?;
    let factory = DefaultOracleFactory::new(&settings.model_path);
    let transcoder = FfmpegTranscoder::new(&settings.ffmpeg_path);
    run_with(settings, &factory, &transcoder)
}

/// Run the pipeline with injected oracles and transcoder
pub fn run_with(
    settings: &Settings,
    factory: &dyn OracleFactory,
    transcoder: &dyn Transcoder,
) -> Result<PipelineResult> {
    settings.validate()?;
    let pipeline_start = Instant::now();

    // Phase 1: Discovery
    let archive_dir = settings.archive_dir();
    info!("Scanning for audio files...");
    let discovery_start = Instant::now();
    let files = discovery::scan(&settings.root, &archive_dir)?;

    if files.is_empty() {
        info!("No files found to analyze");
        return Ok(PipelineResult::default());
    }

    info!(
        "Found {} audio files in {:.2}s",
        files.len(),
        discovery_start.elapsed().as_secs_f64()
    );

    if settings.dry_run {
        return Ok(run_dry_run(&files, settings, &archive_dir));
    }

    // Phase 2: Analysis and commit
    let total_files = files.len();
    let outcomes = process_files(files, settings, factory, transcoder, archive_dir)?;
    let result = PipelineResult::from_outcomes(total_files, outcomes);

    let converted = result
        .outcomes
        .iter()
        .filter(|o| matches!(o, JobOutcome::Committed { commit, .. } if commit.was_transcoded()))
        .count();
    info!(
        "Processed {} files in {:.2}s ({} converted, {} failed)",
        result.total_files,
        pipeline_start.elapsed().as_secs_f64(),
        converted,
        result.failed
    );

    Ok(result)
}

/// Run every file through a fixed pool of `settings.num_threads` workers
fn process_files(
    files: Vec<DiscoveredFile>,
    settings: &Settings,
    factory: &dyn OracleFactory,
    transcoder: &dyn Transcoder,
    archive_dir: PathBuf,
) -> Result<Vec<JobOutcome>> {
    let num_workers = settings.num_threads;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_workers)
        .thread_name(|i| format!("beatprefix-worker-{}", i))
        .build()
        .map_err(|e| BeatprefixError::ConfigError(format!("Failed to build thread pool: {}", e)))?;
    debug!("Configured thread pool with {} threads", num_workers);

    let progress = settings
        .show_progress
        .then(|| progress_bar(files.len() as u64));

    let (job_tx, job_rx) = unbounded::<DiscoveredFile>();
    let (result_tx, result_rx) = unbounded::<JobOutcome>();

    for file in files {
        job_tx.send(file).ok();
    }
    drop(job_tx);

    let ctx = WorkerContext {
        settings,
        factory,
        transcoder,
        archive_dir,
        progress: progress.clone(),
    };

    pool.scope(|scope| {
        for id in 0..num_workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let ctx = &ctx;
            scope.spawn(move |_| Worker::new(id, ctx).run(jobs, results));
        }
    });
    drop(result_tx);

    if let Some(pb) = progress {
        pb.finish_with_message("Done");
    }

    Ok(result_rx.into_iter().collect())
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// Dry run mode - show files that would be processed without touching them
fn run_dry_run(files: &[DiscoveredFile], settings: &Settings, archive_dir: &Path) -> PipelineResult {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    let mut by_directory: BTreeMap<&Path, Vec<&DiscoveredFile>> = BTreeMap::new();
    for file in files {
        let dir = file.path.parent().unwrap_or(&file.path);
        by_directory.entry(dir).or_default().push(file);
    }

    for (dir, dir_files) in &by_directory {
        println!("{}/ ({} files)", dir.display(), dir_files.len());
        for file in dir_files {
            let filename = file
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("?");
            println!("  {}", filename);
        }
        println!();
    }

    let to_convert = files
        .iter()
        .filter(|f| f.format != settings.target_format)
        .count();

    println!("─────────────────────────────────────────");
    println!();
    println!("Would prefix {} files:", files.len());
    println!(
        "  {} converted to {} at {}, originals moved to {}",
        to_convert,
        settings.target_format.extension().to_uppercase(),
        settings.bitrate,
        archive_dir.display()
    );
    println!(
        "  {} retagged in place",
        files.len() - to_convert
    );
    println!();

    PipelineResult {
        total_files: files.len(),
        ..PipelineResult::default()
    }
}
