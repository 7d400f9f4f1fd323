//! MP3 transcoding through the system ffmpeg binary

use crate::error::{BeatprefixError, Result};
use crate::types::TrackTags;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Converts a source file into the target container
pub trait Transcoder: Send + Sync {
    /// Encode `src` to `dst` at `bitrate` (e.g. "320k"), embedding `tags`
    fn transcode(&self, src: &Path, dst: &Path, bitrate: &str, tags: &TrackTags) -> Result<()>;
}

/// Transcoder that shells out to `ffmpeg` with libmp3lame
pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Full ffmpeg argument list for one conversion
    fn args(src: &Path, dst: &Path, bitrate: &str, tags: &TrackTags) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-y",
            "-i",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(src.as_os_str().to_owned());

        for arg in ["-vn", "-codec:a", "libmp3lame", "-b:a", bitrate, "-id3v2_version", "3"] {
            args.push(arg.into());
        }

        for (key, value) in [
            ("title", &tags.title),
            ("artist", &tags.artist),
            ("album", &tags.album),
            ("genre", &tags.genre),
        ] {
            args.push("-metadata".into());
            args.push(format!("{}={}", key, value).into());
        }

        args.push(dst.as_os_str().to_owned());
        args
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, src: &Path, dst: &Path, bitrate: &str, tags: &TrackTags) -> Result<()> {
        debug!(
            "Transcoding {} -> {} at {}",
            src.display(),
            dst.display(),
            bitrate
        );

        let output = Command::new(&self.ffmpeg)
            .args(Self::args(src, dst, bitrate, tags))
            .output()
            .map_err(|e| BeatprefixError::TranscodeError {
                path: src.to_path_buf(),
                reason: match e.kind() {
                    ErrorKind::NotFound => {
                        format!("ffmpeg binary not found at '{}'", self.ffmpeg.display())
                    }
                    _ => format!("Failed to run ffmpeg: {}", e),
                },
            })?;

        if !output.status.success() {
            return Err(BeatprefixError::TranscodeError {
                path: src.to_path_buf(),
                reason: format!(
                    "ffmpeg exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_carry_bitrate_and_tags() {
        let tags = TrackTags {
            title: "[128-08A] Song".into(),
            artist: "Artist".into(),
            album: String::new(),
            genre: "House".into(),
        };
        let args = FfmpegTranscoder::args(Path::new("in.wav"), Path::new("in.mp3"), "320k", &tags);
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(args[5], "in.wav");
        assert!(args.windows(2).any(|w| w == ["-b:a", "320k"]));
        assert!(args.windows(2).any(|w| w == ["-metadata", "title=[128-08A] Song"]));
        assert!(args.windows(2).any(|w| w == ["-metadata", "album="]));
        assert_eq!(args.last().map(String::as_str), Some("in.mp3"));
    }

    #[test]
    fn test_missing_binary_is_transcode_error() {
        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg-binary");
        let err = transcoder
            .transcode(
                Path::new("a.wav"),
                Path::new("a.mp3"),
                "320k",
                &TrackTags::default(),
            )
            .unwrap_err();
        match err {
            BeatprefixError::TranscodeError { reason, .. } => assert!(reason.contains("not found")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
