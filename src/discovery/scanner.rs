//! File discovery and scanning

use crate::error::{BeatprefixError, Result};
use crate::types::AudioFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Discovered audio file and its container
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub format: AudioFormat,
}

/// Recursively scan `root` for audio files
///
/// Files sitting directly in `archive_dir` are skipped; only that exact
/// directory is excluded, not folders nested inside it. Extensions match
/// exactly and case-sensitively.
pub fn scan(root: &Path, archive_dir: &Path) -> Result<Vec<DiscoveredFile>> {
    if !root.exists() {
        return Err(BeatprefixError::FileNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(BeatprefixError::ConfigError(format!(
            "Library path is not a directory: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(BeatprefixError::Io(e.into())),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.parent() == Some(archive_dir) {
            debug!("Skipping archived file: {}", path.display());
            continue;
        }

        if let Some(file) = try_discover_file(path) {
            debug!("Discovered: {}", file.path.display());
            files.push(file);
        }
    }

    info!("Discovered {} audio files", files.len());

    if files.is_empty() {
        warn!("No supported audio files found in {}", root.display());
    }

    Ok(files)
}

/// Try to create a DiscoveredFile if the path is a supported audio format
fn try_discover_file(path: &Path) -> Option<DiscoveredFile> {
    let format = AudioFormat::from_path(path)?;

    Some(DiscoveredFile {
        path: path.to_path_buf(),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn names(files: &[DiscoveredFile], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_scan_filters_extensions_exactly() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for name in ["a.wav", "b.mp3", "c.flac", "d.aif", "e.aiff", "f.WAV", "g.txt", "h.m4a"] {
            touch(&root.join(name));
        }

        let files = scan(root, &root.join("originals")).unwrap();
        assert_eq!(names(&files, root), vec!["a.wav", "b.mp3", "c.flac", "d.aif"]);
        assert_eq!(files[3].format, AudioFormat::Aif);
    }

    #[test]
    fn test_scan_skips_archive_dir_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("set/one.wav"));
        touch(&root.join("originals/archived.wav"));
        touch(&root.join("originals/deeper/nested.wav"));

        let files = scan(root, &root.join("originals")).unwrap();
        assert_eq!(
            names(&files, root),
            vec!["originals/deeper/nested.wav", "set/one.wav"]
        );
    }

    #[test]
    fn test_scan_missing_root() {
        let err = scan(Path::new("/nonexistent/library"), Path::new("/nonexistent/library/o"))
            .unwrap_err();
        assert!(matches!(err, BeatprefixError::FileNotFound(_)));
    }

    #[test]
    fn test_scan_file_root_is_config_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("track.wav");
        touch(&file);

        let err = scan(&file, &dir.path().join("originals")).unwrap_err();
        assert!(matches!(err, BeatprefixError::ConfigError(_)));
    }

    #[test]
    fn test_scan_empty_dir() {
        let dir = TempDir::new().unwrap();
        let files = scan(dir.path(), &dir.path().join("originals")).unwrap();
        assert!(files.is_empty());
    }
}
