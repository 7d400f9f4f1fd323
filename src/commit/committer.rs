//! Per-file commit: rename, title rewrite, transcode and archive
//!
//! Each step works on the output of the previous one. The rename always
//! happens first, so a failure later in the sequence leaves the file
//! renamed but otherwise untouched.

use crate::analysis::metadata;
use crate::audio::Transcoder;
use crate::error::{BeatprefixError, Result};
use crate::naming::{clean_title, title_or_stem, TrackPrefix};
use crate::types::{AudioFormat, TrackTags};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a committed track ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// The prefixed file in the target container
    pub final_path: PathBuf,
    /// Archived original, when the track was transcoded
    pub archived: Option<PathBuf>,
}

impl CommitOutcome {
    pub fn was_transcoded(&self) -> bool {
        self.archived.is_some()
    }
}

/// Applies a prefix to one track on disk
pub struct TrackCommitter<'a> {
    transcoder: &'a dyn Transcoder,
    archive_dir: PathBuf,
    bitrate: String,
    target: AudioFormat,
}

impl<'a> TrackCommitter<'a> {
    pub fn new(
        transcoder: &'a dyn Transcoder,
        archive_dir: impl Into<PathBuf>,
        bitrate: impl Into<String>,
        target: AudioFormat,
    ) -> Self {
        Self {
            transcoder,
            archive_dir: archive_dir.into(),
            bitrate: bitrate.into(),
            target,
        }
    }

    /// Commit `prefix` to the track at `path`
    pub fn commit(&self, path: &Path, prefix: &TrackPrefix) -> Result<CommitOutcome> {
        let renamed = rename_with_prefix(path, prefix)?;

        let mut tags = metadata::read_tags(&renamed);
        tags.title = prefix.apply(&title_or_stem(&tags.title, &renamed));

        let extension = renamed.extension().and_then(|e| e.to_str());
        if extension == Some(self.target.extension()) {
            metadata::write_title(&renamed, &tags.title)?;
            return Ok(CommitOutcome {
                final_path: renamed,
                archived: None,
            });
        }

        self.transcode_and_archive(&renamed, &tags)
    }

    fn transcode_and_archive(&self, renamed: &Path, tags: &TrackTags) -> Result<CommitOutcome> {
        fs::create_dir_all(&self.archive_dir)
            .map_err(|e| BeatprefixError::archive_error(&self.archive_dir, e))?;

        let converted = renamed.with_extension(self.target.extension());
        self.transcoder
            .transcode(renamed, &converted, &self.bitrate, tags)?;

        let file_name = renamed.file_name().ok_or_else(|| BeatprefixError::ArchiveError {
            path: renamed.to_path_buf(),
            reason: "Path has no file name".to_string(),
        })?;
        let archived = self.archive_dir.join(file_name);
        move_file(renamed, &archived).map_err(|e| BeatprefixError::archive_error(renamed, e))?;

        debug!(
            "Converted {} and archived original to {}",
            converted.display(),
            archived.display()
        );

        Ok(CommitOutcome {
            final_path: converted,
            archived: Some(archived),
        })
    }
}

/// Rename `path` to `"{prefix} {cleaned file name}"` in the same directory
fn rename_with_prefix(path: &Path, prefix: &TrackPrefix) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| BeatprefixError::RenameError {
            path: path.to_path_buf(),
            reason: "Path has no file name".to_string(),
        })?;

    let target = path.with_file_name(prefix.apply(clean_title(&file_name)));

    // Already carries this exact prefix
    if target == path {
        debug!("{} already named {}", path.display(), prefix);
        return Ok(target);
    }

    if target.exists() {
        return Err(BeatprefixError::RenameCollision {
            from: path.to_path_buf(),
            to: target,
        });
    }

    fs::rename(path, &target).map_err(|e| BeatprefixError::rename_error(path, e))?;
    debug!("Renamed {} -> {}", path.display(), target.display());
    Ok(target)
}

/// Move a file, copying when a rename cannot cross filesystems
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                "Rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                rename_err
            );
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::key::to_camelot_code;
    use crate::naming::build_prefix;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Copies the source to the destination and records the call
    #[derive(Default)]
    struct CopyTranscoder {
        calls: Mutex<Vec<(PathBuf, PathBuf, String, TrackTags)>>,
    }

    impl Transcoder for CopyTranscoder {
        fn transcode(&self, src: &Path, dst: &Path, bitrate: &str, tags: &TrackTags) -> Result<()> {
            fs::copy(src, dst)?;
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((src.into(), dst.into(), bitrate.into(), tags.clone()));
            }
            Ok(())
        }
    }

    struct FailingTranscoder;

    impl Transcoder for FailingTranscoder {
        fn transcode(&self, src: &Path, _: &Path, _: &str, _: &TrackTags) -> Result<()> {
            Err(BeatprefixError::TranscodeError {
                path: src.to_path_buf(),
                reason: "encoder exploded".into(),
            })
        }
    }

    fn write_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 11025,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..1000 {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn prefix() -> TrackPrefix {
        build_prefix(128.0, &to_camelot_code("A minor"))
    }

    #[test]
    fn test_transcode_branch_archives_original() {
        let dir = TempDir::new().unwrap();
        let track = dir.path().join("[120-01A] Song.wav");
        write_wav(&track);

        let original_audio = fs::read(&track).unwrap();

        let transcoder = CopyTranscoder::default();
        let archive = dir.path().join("originals");
        let committer = TrackCommitter::new(&transcoder, &archive, "256k", AudioFormat::Mp3);

        let outcome = committer.commit(&track, &prefix()).unwrap();

        assert_eq!(outcome.final_path, dir.path().join("[128-08A] Song.mp3"));
        assert_eq!(outcome.archived, Some(archive.join("[128-08A] Song.wav")));
        assert!(outcome.final_path.exists());
        assert_eq!(
            fs::read(archive.join("[128-08A] Song.wav")).unwrap(),
            original_audio,
            "archived original must keep its audio bytes"
        );
        assert!(!track.exists());
        assert!(!dir.path().join("[128-08A] Song.wav").exists());

        let calls = transcoder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].2, "256k");
        // No title tag on a bare WAV: the cleaned stem is used
        assert_eq!(calls[0].3.title, "[128-08A] Song");
    }

    #[test]
    fn test_target_container_rewrites_title_in_place() {
        let dir = TempDir::new().unwrap();
        let track = dir.path().join("Tone.wav");
        write_wav(&track);

        let transcoder = CopyTranscoder::default();
        let archive = dir.path().join("originals");
        let committer = TrackCommitter::new(&transcoder, &archive, "320k", AudioFormat::Wav);

        let outcome = committer.commit(&track, &prefix()).unwrap();

        assert_eq!(outcome.final_path, dir.path().join("[128-08A] Tone.wav"));
        assert!(!outcome.was_transcoded());
        assert!(!archive.exists());
        assert!(transcoder.calls.lock().unwrap().is_empty());
        assert_eq!(
            metadata::read_tags(&outcome.final_path).title,
            "[128-08A] Tone"
        );
    }

    #[test]
    fn test_recommit_with_same_prefix_retags_in_place() {
        let dir = TempDir::new().unwrap();
        let track = dir.path().join("Tone.wav");
        write_wav(&track);

        let transcoder = CopyTranscoder::default();
        let committer =
            TrackCommitter::new(&transcoder, dir.path().join("originals"), "320k", AudioFormat::Wav);

        let first = committer.commit(&track, &prefix()).unwrap();
        let second = committer.commit(&first.final_path, &prefix()).unwrap();

        assert_eq!(second.final_path, first.final_path);
        assert!(!second.was_transcoded());
        assert_eq!(
            metadata::read_tags(&second.final_path).title,
            "[128-08A] Tone"
        );
    }

    #[test]
    fn test_recommit_transcodes_file_already_named() {
        let dir = TempDir::new().unwrap();
        let track = dir.path().join("[128-08A] Song.wav");
        write_wav(&track);

        let transcoder = CopyTranscoder::default();
        let archive = dir.path().join("originals");
        let committer = TrackCommitter::new(&transcoder, &archive, "320k", AudioFormat::Mp3);

        let outcome = committer.commit(&track, &prefix()).unwrap();
        assert_eq!(outcome.final_path, dir.path().join("[128-08A] Song.mp3"));
        assert!(archive.join("[128-08A] Song.wav").exists());
    }

    #[test]
    fn test_rename_failure_is_job_local() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("Gone.wav");

        let transcoder = CopyTranscoder::default();
        let committer = TrackCommitter::new(&transcoder, dir.path().join("o"), "320k", AudioFormat::Mp3);

        let err = committer.commit(&missing, &prefix()).unwrap_err();
        assert!(matches!(err, BeatprefixError::RenameError { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_existing_target_name_is_a_collision() {
        let dir = TempDir::new().unwrap();
        let track = dir.path().join("Song.wav");
        let occupied = dir.path().join("[128-08A] Song.wav");
        write_wav(&track);
        write_wav(&occupied);

        let transcoder = CopyTranscoder::default();
        let committer = TrackCommitter::new(&transcoder, dir.path().join("o"), "320k", AudioFormat::Mp3);

        let err = committer.commit(&track, &prefix()).unwrap_err();
        assert!(matches!(err, BeatprefixError::RenameCollision { .. }));
        assert!(track.exists(), "source must be left in place");
    }

    #[test]
    fn test_transcode_failure_keeps_renamed_source() {
        let dir = TempDir::new().unwrap();
        let track = dir.path().join("Song.flac.wav");
        write_wav(&track);

        let committer =
            TrackCommitter::new(&FailingTranscoder, dir.path().join("originals"), "320k", AudioFormat::Mp3);

        let err = committer.commit(&track, &prefix()).unwrap_err();
        assert!(matches!(err, BeatprefixError::TranscodeError { .. }));
        assert!(dir.path().join("[128-08A] Song.flac.wav").exists());
    }

    #[test]
    fn test_move_file_overwrites_existing_target() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a");
        let to = dir.path().join("b");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"old").unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"new");
    }
}
