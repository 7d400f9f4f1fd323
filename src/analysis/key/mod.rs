//! Key detection module

pub mod camelot;
pub mod hpcp;
pub mod profiles;

pub use camelot::{to_camelot_code, CamelotCode};
pub use hpcp::{HpcpKeyOracle, KeyOracleConfig};
pub use profiles::KeyProfile;

use crate::analysis::traits::KeyOracle;
use crate::error::Result;
use crate::types::{AudioBuffer, KeyEstimate};
use tracing::debug;

/// Estimate the key of `buffer` with the worker's key oracle
pub fn resolve(oracle: &mut dyn KeyOracle, buffer: &AudioBuffer) -> Result<KeyEstimate> {
    let estimate = oracle.estimate(buffer)?;
    debug!(
        "{} key oracle: {} (strength {:.2})",
        oracle.name(),
        estimate.label(),
        estimate.strength
    );
    Ok(estimate)
}
