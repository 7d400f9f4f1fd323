//! Analysis trait abstractions
//!
//! These traits define the interface for swappable oracle backends. Each
//! worker owns one instance of each oracle for its whole lifetime, so
//! implementations only need to be `Send`.

use crate::error::Result;
use crate::types::{AudioBuffer, KeyEstimate, TempoCandidates};

/// Tempo estimation backend
pub trait TempoOracle: Send {
    /// Produce per-segment tempo readings plus a whole-track fallback
    fn estimate(&mut self, buffer: &AudioBuffer) -> Result<TempoCandidates>;

    /// Get the name of this oracle (for logging)
    fn name(&self) -> &'static str;
}

/// Musical key estimation backend
pub trait KeyOracle: Send {
    /// Estimate the key and scale of the audio
    fn estimate(&mut self, buffer: &AudioBuffer) -> Result<KeyEstimate>;

    /// Get the name of this oracle (for logging)
    fn name(&self) -> &'static str;
}

/// Builds the oracles a worker owns
///
/// Called once per worker rather than once per file, so expensive model
/// loading is paid once per thread.
pub trait OracleFactory: Send + Sync {
    fn tempo_oracle(&self) -> Result<Box<dyn TempoOracle>>;

    fn key_oracle(&self) -> Result<Box<dyn KeyOracle>>;
}
