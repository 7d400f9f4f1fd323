//! HPCP-based key oracle
//!
//! Builds a harmonic pitch class profile with sub-semitone resolution from
//! the magnitude spectrum, folds it to 12 semitones and correlates it with
//! the 24 transpositions of a key profile.

use super::profiles::{rotate, KeyProfile};
use crate::analysis::spectral::{bin_frequency, Stft};
use crate::analysis::traits::KeyOracle;
use crate::error::{BeatprefixError, Result};
use crate::types::{AudioBuffer, KeyEstimate, PitchClass, Scale};
use std::path::PathBuf;
use tracing::debug;

/// STFT frame used for chroma (~370ms at 11025 Hz, 2.7 Hz resolution)
const FRAME_SIZE: usize = 4096;
const HOP_SIZE: usize = 2048;

/// Spectral range folded into the profile
const MIN_FREQ: f32 = 65.0;
const MAX_FREQ: f32 = 5000.0;

/// Reference tuning for pitch-class bin 0 placement
const REFERENCE_FREQ: f32 = 440.0;

/// Pitch class of the reference frequency (A)
const REFERENCE_PITCH: f32 = 9.0;

/// Frames quieter than this (sum of magnitudes) carry no tonal information
const SILENCE_FLOOR: f32 = 1e-6;

/// Fixed key oracle configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOracleConfig {
    pub profile: KeyProfile,
    /// Profile resolution; must be a multiple of 12
    pub hpcp_size: usize,
}

impl KeyOracleConfig {
    /// The one configuration the pipeline runs with
    pub const FIXED: KeyOracleConfig = KeyOracleConfig {
        profile: KeyProfile::Edma,
        hpcp_size: 120,
    };
}

impl Default for KeyOracleConfig {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Key oracle matching an HPCP against key profiles
pub struct HpcpKeyOracle {
    config: KeyOracleConfig,
    stft: Stft,
}

impl HpcpKeyOracle {
    pub fn new(config: KeyOracleConfig) -> Self {
        Self {
            config,
            stft: Stft::new(FRAME_SIZE, HOP_SIZE),
        }
    }

    pub fn config(&self) -> KeyOracleConfig {
        self.config
    }

    /// Frame-averaged HPCP, `hpcp_size` bins with bin 0 at C
    fn hpcp(&mut self, buffer: &AudioBuffer) -> Vec<f32> {
        let size = self.config.hpcp_size;
        let bins_per_semitone = size as f32 / 12.0;
        let frame_size = self.stft.frame_size();
        let mut profile = vec![0.0f32; size];

        for power in self.stft.power_frames(&buffer.samples) {
            let mut frame_profile = vec![0.0f32; size];

            for (bin, &p) in power.iter().enumerate() {
                let freq = bin_frequency(bin, frame_size, buffer.sample_rate);
                if !(MIN_FREQ..=MAX_FREQ).contains(&freq) {
                    continue;
                }
                let semitones = 12.0 * (freq / REFERENCE_FREQ).log2() + REFERENCE_PITCH;
                let position = semitones.rem_euclid(12.0) * bins_per_semitone;

                // Split the magnitude between the two nearest profile bins
                let lower = position.floor();
                let frac = position - lower;
                let lower = lower as usize % size;
                let upper = (lower + 1) % size;
                let magnitude = p.sqrt();
                frame_profile[lower] += magnitude * (1.0 - frac);
                frame_profile[upper] += magnitude * frac;
            }

            let peak = frame_profile.iter().cloned().fold(0.0f32, f32::max);
            if peak > SILENCE_FLOOR {
                for (acc, v) in profile.iter_mut().zip(frame_profile.iter()) {
                    *acc += v / peak;
                }
            }
        }

        profile
    }
}

impl Default for HpcpKeyOracle {
    fn default() -> Self {
        Self::new(KeyOracleConfig::FIXED)
    }
}

impl KeyOracle for HpcpKeyOracle {
    fn estimate(&mut self, buffer: &AudioBuffer) -> Result<KeyEstimate> {
        debug!(
            "Analyzing key with {} profile, {} bins ({} samples, {}Hz)",
            self.config.profile.name(),
            self.config.hpcp_size,
            buffer.len(),
            buffer.sample_rate
        );

        if self.config.hpcp_size == 0 || self.config.hpcp_size % 12 != 0 {
            return Err(BeatprefixError::ConfigError(format!(
                "HPCP size must be a positive multiple of 12, got {}",
                self.config.hpcp_size
            )));
        }

        let hpcp = self.hpcp(buffer);
        let chroma = fold_to_semitones(&hpcp);

        if chroma.iter().sum::<f32>() <= SILENCE_FLOOR {
            return Err(BeatprefixError::AnalysisError {
                path: PathBuf::new(),
                reason: "No tonal content found for key detection".to_string(),
            });
        }

        let (tonic, scale, strength) = best_key(&chroma, self.config.profile);
        let estimate = KeyEstimate::new(PitchClass::from_index(tonic).key_name(), scale, strength as f64);

        debug!(
            "Detected key: {} (strength: {:.2})",
            estimate.label(),
            estimate.strength
        );

        Ok(estimate)
    }

    fn name(&self) -> &'static str {
        "hpcp"
    }
}

/// Sum the sub-semitone bins around each semitone center
fn fold_to_semitones(hpcp: &[f32]) -> [f32; 12] {
    let bins_per_semitone = hpcp.len() / 12;
    let half = bins_per_semitone / 2;
    let mut chroma = [0.0f32; 12];
    for (bin, &v) in hpcp.iter().enumerate() {
        let semitone = ((bin + half) / bins_per_semitone) % 12;
        chroma[semitone] += v;
    }
    chroma
}

/// Best (tonic, scale, correlation) over all 24 keys
fn best_key(chroma: &[f32; 12], profile: KeyProfile) -> (usize, Scale, f32) {
    let mut best = (0usize, Scale::Major, f32::NEG_INFINITY);
    for (scale, template) in [(Scale::Major, profile.major()), (Scale::Minor, profile.minor())] {
        for tonic in 0..12 {
            let score = pearson(chroma, &rotate(template, tonic));
            if score > best.2 {
                best = (tonic, scale, score);
            }
        }
    }
    best
}

fn pearson(a: &[f32; 12], b: &[f32; 12]) -> f32 {
    let mean_a = a.iter().sum::<f32>() / 12.0;
    let mean_b = b.iter().sum::<f32>() / 12.0;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    let denom = (var_a * var_b).sqrt();
    if denom > 0.0 {
        cov / denom
    } else {
        0.0
    }
}
