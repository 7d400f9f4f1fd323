//! BPM resolution
//!
//! Turns the tempo oracle's per-segment readings into one representative
//! BPM. When the readings disagree completely, the most confident one wins;
//! when the oracle repeated a reading, the most frequent one wins.

#[cfg(feature = "tempocnn")]
pub mod tempocnn;

#[cfg(feature = "tempocnn")]
pub use tempocnn::TempoCnnOracle;

use crate::types::{TempoCandidate, TempoCandidates};
use std::cmp::Ordering;
use tracing::trace;

/// Candidates at or below this confidence are ignored
pub const MIN_CONFIDENCE: f64 = 0.2;

/// Inclusive tempo range a candidate must fall in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpmBounds {
    pub min: f64,
    pub max: f64,
}

impl BpmBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, bpm: f64) -> bool {
        self.min <= bpm && bpm <= self.max
    }
}

impl Default for BpmBounds {
    fn default() -> Self {
        Self::new(90.0, 180.0)
    }
}

/// Resolve a single BPM from the oracle output
///
/// The fallback is returned as-is when nothing survives filtering, even if
/// it lies outside `bounds`.
pub fn resolve(candidates: &TempoCandidates, bounds: BpmBounds) -> f64 {
    let filtered: Vec<TempoCandidate> = candidates
        .candidates
        .iter()
        .copied()
        .filter(|c| c.confidence > MIN_CONFIDENCE && bounds.contains(c.bpm))
        .collect();

    if filtered.is_empty() {
        trace!(
            "No tempo candidate passed filtering, using fallback {:.2}",
            candidates.fallback_bpm
        );
        return candidates.fallback_bpm;
    }

    let counts = value_counts(&filtered);

    if counts.len() == filtered.len() {
        return most_confident(&filtered);
    }

    most_frequent(&counts)
}

/// First candidate holding the highest confidence
fn most_confident(candidates: &[TempoCandidate]) -> f64 {
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.confidence > best.confidence {
            best = *candidate;
        }
    }
    best.bpm
}

/// Highest count wins; `counts` is ascending by value so ties go to the smaller BPM
fn most_frequent(counts: &[(f64, usize)]) -> f64 {
    let mut best = counts[0];
    for entry in &counts[1..] {
        if entry.1 > best.1 {
            best = *entry;
        }
    }
    best.0
}

/// Distinct values (exact equality) with occurrence counts, ascending by value
fn value_counts(candidates: &[TempoCandidate]) -> Vec<(f64, usize)> {
    let mut values: Vec<f64> = candidates.iter().map(|c| c.bpm).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut counts: Vec<(f64, usize)> = Vec::with_capacity(values.len());
    for value in values {
        match counts.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => counts.push((value, 1)),
        }
    }
    counts
}
