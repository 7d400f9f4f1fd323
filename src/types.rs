//! Core data types for beatprefix
//!
//! These types represent the domain model and flow through the pipeline.

use std::fmt;
use std::path::Path;

// =============================================================================
// Musical primitives
// =============================================================================

/// The 12 pitch classes in Western music
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs, // C#/Db
    D,
    Ds, // D#/Eb
    E,
    F,
    Fs, // F#/Gb
    G,
    Gs, // G#/Ab
    A,
    As, // A#/Bb
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order starting at C
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Convert from numeric index (0 = C, 1 = C#, ..., 11 = B)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Key-name spelling used in key labels and the Camelot table
    ///
    /// Sharps for C# and F#, flats for Eb, Ab and Bb.
    pub fn key_name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "Eb",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "Ab",
            PitchClass::A => "A",
            PitchClass::As => "Bb",
            PitchClass::B => "B",
        }
    }
}

/// Major or minor scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scale {
    Major,
    Minor,
}

impl Scale {
    pub fn as_str(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Oracle outputs
// =============================================================================

/// One tempo reading from the tempo oracle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoCandidate {
    pub bpm: f64,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
}

impl TempoCandidate {
    pub fn new(bpm: f64, confidence: f64) -> Self {
        Self { bpm, confidence }
    }
}

/// Everything the tempo oracle produced for one track
#[derive(Debug, Clone, PartialEq)]
pub struct TempoCandidates {
    /// Per-segment readings, in the order the oracle emitted them
    pub candidates: Vec<TempoCandidate>,
    /// The oracle's own whole-track estimate
    pub fallback_bpm: f64,
}

impl TempoCandidates {
    pub fn new(candidates: Vec<TempoCandidate>, fallback_bpm: f64) -> Self {
        Self {
            candidates,
            fallback_bpm,
        }
    }
}

/// Musical key reported by the key oracle
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    /// Key letter as spelled by the oracle ("C", "F#", "Bb", ...)
    pub key: String,
    pub scale: Scale,
    /// Oracle-specific strength; informational only
    pub strength: f64,
}

impl KeyEstimate {
    pub fn new(key: impl Into<String>, scale: Scale, strength: f64) -> Self {
        Self {
            key: key.into(),
            scale,
            strength,
        }
    }

    /// Canonical "Key scale" label, e.g. "F# minor"
    pub fn label(&self) -> String {
        format!("{} {}", self.key, self.scale)
    }
}

// =============================================================================
// Track representation
// =============================================================================

/// Tag fields carried through a commit; empty when absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
}

// =============================================================================
// Audio buffer types
// =============================================================================

/// Decoded audio samples ready for analysis
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats supported by beatprefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Aif,
}

impl AudioFormat {
    /// Detect format from file extension; matched exactly, case-sensitive
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "wav" => Some(AudioFormat::Wav),
            "mp3" => Some(AudioFormat::Mp3),
            "flac" => Some(AudioFormat::Flac),
            "aif" => Some(AudioFormat::Aif),
            _ => None,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Flac => "flac",
            AudioFormat::Aif => "aif",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_label() {
        let estimate = KeyEstimate::new("F#", Scale::Minor, 0.7);
        assert_eq!(estimate.label(), "F# minor");
    }

    #[test]
    fn test_extensions_are_case_sensitive() {
        assert_eq!(AudioFormat::from_extension("aif"), Some(AudioFormat::Aif));
        assert_eq!(AudioFormat::from_extension("aiff"), None);
        assert_eq!(AudioFormat::from_extension("WAV"), None);
        assert_eq!(AudioFormat::from_path(Path::new("/m/a.flac")), Some(AudioFormat::Flac));
        assert_eq!(AudioFormat::from_path(Path::new("/m/cover.jpg")), None);
        for ext in ["wav", "mp3", "flac", "aif"] {
            assert_eq!(AudioFormat::from_extension(ext).map(|f| f.extension()), Some(ext));
        }
    }

    #[test]
    fn test_pitch_class_spelling_wraps() {
        assert_eq!(PitchClass::from_index(8).key_name(), "Ab");
        assert_eq!(PitchClass::from_index(13).key_name(), "C#");
    }
}
