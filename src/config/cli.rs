//! CLI argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// beatprefix - tag a DJ library with [BPM-Camelot] prefixes
///
/// Estimates tempo and key for every track under a directory, prefixes file
/// names and title tags with `[BPM-Camelot]`, converts non-MP3 files to MP3
/// and moves the originals into an archive folder.
#[derive(Parser, Debug)]
#[command(name = "beatprefix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory to analyze
    #[arg(short, long, value_name = "DIR")]
    pub dir: PathBuf,

    /// Path to the TempoCNN ONNX model file
    #[arg(short, long, value_name = "FILE", default_value = "deeptemp-k16-3.onnx")]
    pub model: PathBuf,

    /// Min and max BPM accepted from the tempo model, e.g. --bpm-limits 90 180
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], default_values_t = [90, 180])]
    pub bpm_limits: Vec<u32>,

    /// Folder (inside DIR) where originals are moved; it is never analyzed
    #[arg(long, value_name = "NAME", default_value = "originals")]
    pub safe_folder: PathBuf,

    /// Bitrate for MP3 conversion. Examples: 192k, 256k, 320k
    #[arg(short, long, value_name = "RATE", default_value = "320k")]
    pub bitrate: String,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short = 'j', long, value_name = "N", default_value_t = 8)]
    pub num_threads: usize,

    /// ffmpeg executable used for MP3 conversion
    #[arg(long, value_name = "PATH", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Dry run - show files that would be processed without touching them
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["beatprefix", "--dir", "/music"]);
        assert_eq!(cli.dir, PathBuf::from("/music"));
        assert_eq!(cli.bpm_limits, vec![90, 180]);
        assert_eq!(cli.safe_folder, PathBuf::from("originals"));
        assert_eq!(cli.bitrate, "320k");
        assert_eq!(cli.num_threads, 8);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_bpm_limits_take_two_values() {
        let cli = Cli::parse_from(["beatprefix", "-d", "/m", "--bpm-limits", "70", "140"]);
        assert_eq!(cli.bpm_limits, vec![70, 140]);
    }

    #[test]
    fn test_dir_is_required() {
        assert!(Cli::try_parse_from(["beatprefix"]).is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::parse_from(["beatprefix", "-d", "/m", "-vv"]);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
        let cli = Cli::parse_from(["beatprefix", "-d", "/m", "-v", "-q"]);
        assert_eq!(cli.log_level(), tracing::Level::ERROR);
    }
}
