//! Filename and title normalization
//!
//! Prefixes look like `[128-08A]`: a BPM field and a Camelot code. Any
//! bracketed tags already at the front of a name are stripped before a new
//! prefix is applied, so re-running on a tagged library does not stack
//! prefixes.

use crate::analysis::key::CamelotCode;
use std::fmt;
use std::path::Path;

/// A `[BBB-CCC]` prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPrefix(String);

impl TrackPrefix {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Apply the prefix to a cleaned name, separated by one space
    pub fn apply(&self, name: &str) -> String {
        format!("{} {}", self.0, name)
    }
}

impl fmt::Display for TrackPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the prefix for a resolved BPM and key code
///
/// The BPM is truncated toward zero. Values below 100 get a single leading
/// zero ("087"); others are written as-is ("128", "1000").
pub fn build_prefix(bpm: f64, code: &CamelotCode) -> TrackPrefix {
    let whole = bpm.trunc() as i64;
    let bpm_field = if bpm < 100.0 {
        format!("0{}", whole)
    } else {
        whole.to_string()
    };
    TrackPrefix(format!("[{}-{}]", bpm_field, code))
}

/// Strip leading bracketed tags
///
/// While the name starts with `[` and contains a `]`, everything through the
/// first `]` is dropped along with the whitespace after it.
pub fn clean_title(name: &str) -> &str {
    let mut rest = name;
    while rest.starts_with('[') {
        match rest.split_once(']') {
            Some((_, tail)) => rest = tail.trim_start(),
            None => break,
        }
    }
    rest
}

/// Cleaned tag title, or the cleaned file stem when the title is empty
pub fn title_or_stem(tag_title: &str, path: &Path) -> String {
    let title = clean_title(tag_title);
    if !title.is_empty() {
        return title.to_string();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    clean_title(&stem).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::key::to_camelot_code;

    #[test]
    fn test_clean_title_strips_stacked_prefixes() {
        assert_eq!(clean_title("[087-05A] [120-09B] Track"), "Track");
        assert_eq!(clean_title("[128-08B]Track.mp3"), "Track.mp3");
    }

    #[test]
    fn test_clean_title_leaves_inner_brackets() {
        assert_eq!(clean_title("Track [Remix]"), "Track [Remix]");
        assert_eq!(clean_title("[unterminated tag"), "[unterminated tag");
        assert_eq!(clean_title(""), "");
    }

    #[test]
    fn test_clean_title_is_idempotent() {
        for name in ["[1] [2] x", "x", "[a]", "[ [b] c", "  [a] b"] {
            let once = clean_title(name);
            assert_eq!(clean_title(once), once);
        }
    }

    #[test]
    fn test_build_prefix_padding() {
        assert_eq!(build_prefix(87.0, &to_camelot_code("C minor")).as_str(), "[087-05A]");
        assert_eq!(build_prefix(128.0, &to_camelot_code("G major")).as_str(), "[128-09B]");
        assert_eq!(build_prefix(99.9, &to_camelot_code("A minor")).as_str(), "[099-08A]");
        assert_eq!(build_prefix(100.0, &to_camelot_code("A minor")).as_str(), "[100-08A]");
    }

    #[test]
    fn test_build_prefix_irregular_widths() {
        let code = to_camelot_code("C major");
        assert_eq!(build_prefix(5.0, &code).as_str(), "[05-08B]");
        assert_eq!(build_prefix(1000.0, &code).as_str(), "[1000-08B]");
    }

    #[test]
    fn test_build_prefix_unmapped_key() {
        let prefix = build_prefix(140.0, &CamelotCode::UNMAPPED);
        assert_eq!(prefix.to_string(), "[140-NAN]");
        assert_eq!(prefix.apply("Song"), "[140-NAN] Song");
    }

    #[test]
    fn test_title_or_stem() {
        let path = Path::new("/music/[128-08B] Old Name.wav");
        assert_eq!(title_or_stem("[120-01A] Real Title", path), "Real Title");
        assert_eq!(title_or_stem("", path), "Old Name");
        assert_eq!(title_or_stem("[120-01A]", path), "Old Name");
    }
}
