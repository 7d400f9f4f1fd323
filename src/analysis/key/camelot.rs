//! Camelot Wheel notation mapping
//!
//! The Camelot Wheel is a visual representation of musical keys that
//! makes harmonic mixing intuitive for DJs.
//!
//! - Numbers 01-12 represent positions on the wheel
//! - 'A' suffix = minor key, 'B' suffix = major key
//! - Adjacent numbers are harmonically compatible (perfect fifth)
//! - Same number, different letter = relative major/minor
//!
//! Codes are zero-padded to two digits so that prefixed filenames sort
//! around the wheel.

use crate::types::KeyEstimate;
use std::fmt;

/// A Camelot code such as "08A", or the unmapped sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CamelotCode(&'static str);

impl CamelotCode {
    /// Code for any label outside the 24-key table
    pub const UNMAPPED: CamelotCode = CamelotCode("NAN");

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn is_mapped(&self) -> bool {
        *self != Self::UNMAPPED
    }
}

impl fmt::Display for CamelotCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Mapping from a "Key scale" label to Camelot notation
///
/// The minor ring runs 01A (Ab minor) to 12A (C# minor) in fifths; the
/// major ring is offset so that 08B (C major) sits beside its relative
/// minor 08A (A minor).
///
/// Exact match only: no case folding and no enharmonic aliases, so
/// "c major" and "G# minor" are both unmapped.
pub fn to_camelot_code(label: &str) -> CamelotCode {
    let code = match label {
        // Minor keys (A)
        "Ab minor" => "01A",
        "Eb minor" => "02A",
        "Bb minor" => "03A",
        "F minor" => "04A",
        "C minor" => "05A",
        "G minor" => "06A",
        "D minor" => "07A",
        "A minor" => "08A",
        "E minor" => "09A",
        "B minor" => "10A",
        "F# minor" => "11A",
        "C# minor" => "12A",

        // Major keys (B)
        "B major" => "01B",
        "F# major" => "02B",
        "C# major" => "03B",
        "Ab major" => "04B",
        "Eb major" => "05B",
        "Bb major" => "06B",
        "F major" => "07B",
        "C major" => "08B",
        "G major" => "09B",
        "D major" => "10B",
        "A major" => "11B",
        "E major" => "12B",

        _ => return CamelotCode::UNMAPPED,
    };
    CamelotCode(code)
}

impl KeyEstimate {
    /// Camelot code of this estimate's label
    pub fn camelot(&self) -> CamelotCode {
        to_camelot_code(&self.label())
    }
}
