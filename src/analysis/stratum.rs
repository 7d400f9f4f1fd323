//! Stratum-DSP based tempo oracle
//!
//! Runs the stratum-dsp tempo estimator over overlapping windows of the
//! track to get per-segment readings, plus once over the whole track for
//! the fallback value.

use crate::analysis::traits::TempoOracle;
use crate::error::{BeatprefixError, Result};
use crate::types::{AudioBuffer, TempoCandidate, TempoCandidates};
use std::path::PathBuf;
use stratum_dsp::{analyze_audio, AnalysisConfig};
use tracing::{debug, trace};

/// Window length for per-segment readings, in seconds
const WINDOW_SECONDS: f64 = 12.0;

/// Distance between window starts, in seconds
const HOP_SECONDS: f64 = 6.0;

/// Tempo oracle using stratum-dsp
///
/// Uses autocorrelation and comb filterbank analysis for tempo detection.
/// Readings are rounded to whole BPM so that repeated segment estimates
/// agree exactly.
pub struct StratumTempoOracle {
    window_seconds: f64,
    hop_seconds: f64,
}

impl StratumTempoOracle {
    pub fn new() -> Self {
        Self {
            window_seconds: WINDOW_SECONDS,
            hop_seconds: HOP_SECONDS,
        }
    }

    /// Sample ranges of the analysis windows for a buffer
    fn windows(&self, buffer: &AudioBuffer) -> Vec<(usize, usize)> {
        let window = (self.window_seconds * buffer.sample_rate as f64) as usize;
        let hop = ((self.hop_seconds * buffer.sample_rate as f64) as usize).max(1);
        if window == 0 || buffer.len() < window {
            return Vec::new();
        }

        let mut ranges = Vec::new();
        let mut start = 0;
        while start + window <= buffer.len() {
            ranges.push((start, start + window));
            start += hop;
        }
        ranges
    }
}

impl Default for StratumTempoOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoOracle for StratumTempoOracle {
    fn estimate(&mut self, buffer: &AudioBuffer) -> Result<TempoCandidates> {
        debug!(
            "Analyzing BPM with stratum-dsp ({} samples, {}Hz)",
            buffer.len(),
            buffer.sample_rate
        );

        let whole = analyze_audio(&buffer.samples, buffer.sample_rate, AnalysisConfig::default())
            .map_err(|e| BeatprefixError::AnalysisError {
                path: PathBuf::new(),
                reason: format!("BPM analysis failed: {}", e),
            })?;
        let fallback = (whole.bpm as f64).round();

        let mut candidates = Vec::new();
        for (start, end) in self.windows(buffer) {
            match analyze_audio(
                &buffer.samples[start..end],
                buffer.sample_rate,
                AnalysisConfig::default(),
            ) {
                Ok(result) => candidates.push(TempoCandidate::new(
                    (result.bpm as f64).round(),
                    result.bpm_confidence as f64,
                )),
                Err(e) => trace!("Skipping window {}..{}: {}", start, end, e),
            }
        }

        debug!(
            "Detected BPM: {:.0} (confidence: {:.2}), {} segment readings",
            fallback,
            whole.bpm_confidence,
            candidates.len()
        );

        Ok(TempoCandidates::new(candidates, fallback))
    }

    fn name(&self) -> &'static str {
        "stratum-dsp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stratum_tempo_oracle_name() {
        let oracle = StratumTempoOracle::default();
        assert_eq!(oracle.name(), "stratum-dsp");
    }

    #[test]
    fn test_windows_overlap_by_half() {
        let oracle = StratumTempoOracle::new();
        let buffer = AudioBuffer::new(vec![0.0; 30 * 100], 100);
        // 30s track: windows at 0, 6, 12, 18
        assert_eq!(
            oracle.windows(&buffer),
            vec![(0, 1200), (600, 1800), (1200, 2400), (1800, 3000)]
        );
    }

    #[test]
    fn test_short_track_has_no_windows() {
        let oracle = StratumTempoOracle::new();
        let buffer = AudioBuffer::new(vec![0.0; 500], 100);
        assert!(oracle.windows(&buffer).is_empty());
    }
}
