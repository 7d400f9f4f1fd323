//! Runtime configuration settings

use crate::analysis::bpm::BpmBounds;
use crate::error::{BeatprefixError, Result};
use crate::types::AudioFormat;
use std::path::PathBuf;

/// Sample rate the tempo and key oracles expect
pub const ANALYSIS_SAMPLE_RATE: u32 = 11025;

/// Archive folder name used when the configured one has no file name
const DEFAULT_ARCHIVE_FOLDER: &str = "originals";

/// Runtime settings for one run of the pipeline
///
/// Passed by reference into discovery, workers and the committer; nothing
/// about a run lives in global state.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Library root to analyze
    pub root: PathBuf,
    /// TempoCNN model file
    pub model_path: PathBuf,
    /// Accepted tempo range for oracle candidates
    pub bpm_bounds: BpmBounds,
    /// Archive folder name, resolved against `root`
    pub archive_folder: PathBuf,
    /// Encoder bitrate, ffmpeg syntax ("320k")
    pub bitrate: String,
    /// Number of workers
    pub num_threads: usize,
    /// Decode rate for analysis
    pub sample_rate: u32,
    /// Container every track ends up in
    pub target_format: AudioFormat,
    /// ffmpeg executable
    pub ffmpeg_path: PathBuf,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - show files without processing
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        let num_threads = if cli.num_threads == 0 {
            num_cpus::get().max(1)
        } else {
            cli.num_threads
        };

        let (min, max) = match cli.bpm_limits.as_slice() {
            [min, max] => (*min as f64, *max as f64),
            _ => (BpmBounds::default().min, BpmBounds::default().max),
        };

        Self {
            root: cli.dir.clone(),
            model_path: cli.model.clone(),
            bpm_bounds: BpmBounds::new(min, max),
            archive_folder: cli.safe_folder.clone(),
            bitrate: cli.bitrate.clone(),
            num_threads,
            sample_rate: ANALYSIS_SAMPLE_RATE,
            target_format: AudioFormat::Mp3,
            ffmpeg_path: cli.ffmpeg.clone(),
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        }
    }

    /// Directory holding archived originals for this run
    ///
    /// Only the last component of `archive_folder` is used, so the archive
    /// always sits directly under `root`.
    pub fn archive_dir(&self) -> PathBuf {
        let name = self
            .archive_folder
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_FOLDER));
        self.root.join(name)
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.bpm_bounds.min > self.bpm_bounds.max {
            return Err(BeatprefixError::ConfigError(format!(
                "BPM limits are reversed: min {} is above max {}",
                self.bpm_bounds.min, self.bpm_bounds.max
            )));
        }
        if self.num_threads == 0 {
            return Err(BeatprefixError::ConfigError(
                "Worker count must be at least 1".to_string(),
            ));
        }
        if self.bitrate.trim().is_empty() {
            return Err(BeatprefixError::ConfigError(
                "Bitrate must not be empty (e.g. 320k)".to_string(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(BeatprefixError::ConfigError(
                "Analysis sample rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            model_path: PathBuf::from("deeptemp-k16-3.onnx"),
            bpm_bounds: BpmBounds::default(),
            archive_folder: PathBuf::from(DEFAULT_ARCHIVE_FOLDER),
            bitrate: "320k".to_string(),
            num_threads: 8,
            sample_rate: ANALYSIS_SAMPLE_RATE,
            target_format: AudioFormat::Mp3,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            show_progress: true,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use clap::Parser;

    #[test]
    fn test_archive_dir_uses_last_component() {
        let settings = Settings {
            root: PathBuf::from("/music"),
            archive_folder: PathBuf::from("nested/keep"),
            ..Settings::default()
        };
        assert_eq!(settings.archive_dir(), PathBuf::from("/music/keep"));
    }

    #[test]
    fn test_from_cli_maps_limits_and_threads() {
        let cli = Cli::parse_from(["beatprefix", "-d", "/m", "--bpm-limits", "70", "140", "-j", "3"]);
        let settings = Settings::from_cli(&cli);
        assert_eq!(settings.bpm_bounds, BpmBounds::new(70.0, 140.0));
        assert_eq!(settings.num_threads, 3);
        assert_eq!(settings.sample_rate, ANALYSIS_SAMPLE_RATE);
        assert_eq!(settings.target_format, AudioFormat::Mp3);
    }

    #[test]
    fn test_zero_threads_means_cpu_count() {
        let cli = Cli::parse_from(["beatprefix", "-d", "/m", "-j", "0"]);
        assert!(Settings::from_cli(&cli).num_threads >= 1);
    }

    #[test]
    fn test_validate_rejects_reversed_limits() {
        let settings = Settings {
            bpm_bounds: BpmBounds::new(180.0, 90.0),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(BeatprefixError::ConfigError(_))));
        assert!(Settings::default().validate().is_ok());
    }
}
