//! Tag reading and title rewriting
//!
//! Uses lofty to read and write ID3v2 (MP3, WAV), Vorbis comments (FLAC),
//! and AIFF tags.

use crate::error::{BeatprefixError, Result};
use crate::types::TrackTags;
use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::path::Path;
use tracing::{debug, warn};

/// Read the tag fields carried through a commit
///
/// Missing or unreadable tags yield empty strings; this never fails.
pub fn read_tags(path: &Path) -> TrackTags {
    match read_tags_inner(path) {
        Ok(tags) => tags,
        Err(e) => {
            warn!("Failed to read tags from {}: {}", path.display(), e);
            TrackTags::default()
        }
    }
}

fn read_tags_inner(path: &Path) -> std::result::Result<TrackTags, lofty::error::LoftyError> {
    let tagged_file = Probe::open(path)?.read()?;
    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    let tags = match tag {
        Some(tag) => TrackTags {
            title: tag.title().map(|s| s.to_string()).unwrap_or_default(),
            artist: tag.artist().map(|s| s.to_string()).unwrap_or_default(),
            album: tag.album().map(|s| s.to_string()).unwrap_or_default(),
            genre: tag.genre().map(|s| s.to_string()).unwrap_or_default(),
        },
        None => {
            debug!("No tags found in {}", path.display());
            TrackTags::default()
        }
    };

    Ok(tags)
}

/// Set the title tag in place, creating the file's primary tag if it has none
pub fn write_title(path: &Path, title: &str) -> Result<()> {
    let tag_error = |e: lofty::error::LoftyError| BeatprefixError::TagError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut tagged_file = Probe::open(path)
        .map_err(tag_error)?
        .read()
        .map_err(tag_error)?;

    if tagged_file.primary_tag().is_none() {
        let tag_type = tagged_file.primary_tag_type();
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    let tag = tagged_file
        .primary_tag_mut()
        .ok_or_else(|| BeatprefixError::TagError {
            path: path.to_path_buf(),
            reason: "File format does not support a writable tag".to_string(),
        })?;
    tag.set_title(title.to_string());

    tagged_file
        .save_to_path(path, WriteOptions::default())
        .map_err(tag_error)?;

    debug!("Title set on {}: {}", path.display(), title);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 11025,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..2205 {
            writer.write_sample(((i % 50) as i16 - 25) * 100).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_tags_of_missing_file_is_empty() {
        let tags = read_tags(Path::new("/nonexistent/track.mp3"));
        assert_eq!(tags, TrackTags::default());
    }

    #[test]
    fn test_write_then_read_title() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path);

        assert_eq!(read_tags(&path).title, "");
        write_title(&path, "[128-08A] Tone").unwrap();
        assert_eq!(read_tags(&path).title, "[128-08A] Tone");
    }

    #[test]
    fn test_write_title_on_garbage_is_tag_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.mp3");
        std::fs::write(&path, b"not audio at all").unwrap();

        let err = write_title(&path, "x").unwrap_err();
        assert!(matches!(err, BeatprefixError::TagError { .. }));
    }
}
