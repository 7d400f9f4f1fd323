//! Unified error types for beatprefix
//!
//! Error strategy:
//! - Per-file errors (decode, analysis, rename, tags, transcode): isolated to
//!   the job, recorded in the run summary, the batch continues
//! - Discovery and configuration errors: fatal, abort before any job starts
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "WAV, MP3, FLAC, AIF";

/// Top-level error type for beatprefix operations
#[derive(Debug, Error)]
pub enum BeatprefixError {
    // =========================================================================
    // Job-local errors - recorded for the file, batch continues
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Analysis failed for '{path}': {reason}")]
    AnalysisError { path: PathBuf, reason: String },

    #[error("Tempo model unavailable: {reason}\n  Tip: Pass the TempoCNN ONNX file with --model and build with --features tempocnn")]
    ModelUnavailable { reason: String },

    #[error("Cannot rename '{from}' to '{to}': target already exists\n  Tip: Another file already carries this prefix and title in the same folder")]
    RenameCollision { from: PathBuf, to: PathBuf },

    #[error("Failed to rename '{path}': {reason}")]
    RenameError { path: PathBuf, reason: String },

    #[error("Failed to write tags to '{path}': {reason}")]
    TagError { path: PathBuf, reason: String },

    #[error("Failed to transcode '{path}': {reason}\n  Tip: Check that ffmpeg is installed and built with libmp3lame")]
    TranscodeError { path: PathBuf, reason: String },

    #[error("Failed to archive original '{path}': {reason}\n  Tip: Check write permissions for the archive folder")]
    ArchiveError { path: PathBuf, reason: String },

    // =========================================================================
    // Fatal errors - abort the run before jobs start
    // =========================================================================
    #[error("Directory not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for beatprefix operations
pub type Result<T> = std::result::Result<T, BeatprefixError>;

impl BeatprefixError {
    /// Returns true if this error only affects the file being processed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BeatprefixError::DecodeError { .. }
                | BeatprefixError::AnalysisError { .. }
                | BeatprefixError::ModelUnavailable { .. }
                | BeatprefixError::RenameCollision { .. }
                | BeatprefixError::RenameError { .. }
                | BeatprefixError::TagError { .. }
                | BeatprefixError::TranscodeError { .. }
                | BeatprefixError::ArchiveError { .. }
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BeatprefixError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an archive error, translating common io failures
    pub fn archive_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("Directory does not exist: {}", path.parent().map(|p| p.display().to_string()).unwrap_or_default())
            }
            _ => err.to_string(),
        };
        BeatprefixError::ArchiveError { path, reason }
    }

    /// Create a rename error, translating common io failures
    pub fn rename_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                "Permission denied. Check that the folder is writable".to_string()
            }
            _ => err.to_string(),
        };
        BeatprefixError::RenameError { path, reason }
    }

    /// Attach a file path to an analysis error raised without one
    pub fn with_path(self, path: &std::path::Path) -> Self {
        match self {
            BeatprefixError::AnalysisError { reason, .. } => BeatprefixError::AnalysisError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_job_errors_are_recoverable() {
        let collision = BeatprefixError::RenameCollision {
            from: PathBuf::from("a.wav"),
            to: PathBuf::from("[128-09B] a.wav"),
        };
        assert!(collision.is_recoverable());
        assert!(BeatprefixError::decode_error("x.flac", "bad header").is_recoverable());
    }

    #[test]
    fn test_discovery_errors_are_fatal() {
        assert!(!BeatprefixError::FileNotFound(PathBuf::from("/nope")).is_recoverable());
        assert!(!BeatprefixError::ConfigError("bad".into()).is_recoverable());
    }

    #[test]
    fn test_with_path_fills_analysis_error() {
        let err = BeatprefixError::AnalysisError {
            path: PathBuf::new(),
            reason: "silent".into(),
        }
        .with_path(Path::new("/music/track.wav"));

        match err {
            BeatprefixError::AnalysisError { path, .. } => {
                assert_eq!(path, PathBuf::from("/music/track.wav"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rename_failure_is_job_local() {
        let err = BeatprefixError::rename_error(
            "/music/a.wav",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("/music/a.wav"));
    }
}
