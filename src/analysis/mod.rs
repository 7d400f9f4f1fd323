//! Audio analysis modules
//!
//! This module provides traits for oracle backends and concrete implementations.
//! The trait abstraction allows swapping backends without changing pipeline code.

pub mod bpm;
pub mod key;
pub mod metadata;
pub mod spectral;
pub mod stratum;
pub mod traits;

pub use traits::{KeyOracle, OracleFactory, TempoOracle};

pub use key::{HpcpKeyOracle, KeyOracleConfig};
pub use stratum::StratumTempoOracle;

#[cfg(feature = "tempocnn")]
pub use bpm::TempoCnnOracle;

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Tempo backend picked for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoBackend {
    TempoCnn,
    Stratum,
}

/// Builds the production oracles
///
/// TempoCNN is used when the crate is built with the `tempocnn` feature and
/// the model file exists; otherwise every worker falls back to stratum-dsp.
pub struct DefaultOracleFactory {
    model_path: PathBuf,
    backend: TempoBackend,
}

impl DefaultOracleFactory {
    pub fn new(model_path: &Path) -> Self {
        let backend = Self::select_backend(model_path);
        info!("Tempo oracle: {:?}", backend);
        Self {
            model_path: model_path.to_path_buf(),
            backend,
        }
    }

    pub fn backend(&self) -> TempoBackend {
        self.backend
    }

    #[cfg(feature = "tempocnn")]
    fn select_backend(model_path: &Path) -> TempoBackend {
        if model_path.is_file() {
            TempoBackend::TempoCnn
        } else {
            warn!(
                "TempoCNN model not found at {}, using stratum-dsp tempo estimation",
                model_path.display()
            );
            TempoBackend::Stratum
        }
    }

    #[cfg(not(feature = "tempocnn"))]
    fn select_backend(model_path: &Path) -> TempoBackend {
        if model_path.is_file() {
            warn!(
                "Ignoring model {}: built without the 'tempocnn' feature, using stratum-dsp",
                model_path.display()
            );
        }
        TempoBackend::Stratum
    }
}

impl OracleFactory for DefaultOracleFactory {
    fn tempo_oracle(&self) -> Result<Box<dyn TempoOracle>> {
        match self.backend {
            #[cfg(feature = "tempocnn")]
            TempoBackend::TempoCnn => Ok(Box::new(TempoCnnOracle::load(&self.model_path)?)),
            #[cfg(not(feature = "tempocnn"))]
            TempoBackend::TempoCnn => Err(crate::error::BeatprefixError::ModelUnavailable {
                reason: format!(
                    "{} requires the 'tempocnn' feature",
                    self.model_path.display()
                ),
            }),
            TempoBackend::Stratum => Ok(Box::new(StratumTempoOracle::new())),
        }
    }

    fn key_oracle(&self) -> Result<Box<dyn KeyOracle>> {
        Ok(Box::new(HpcpKeyOracle::new(KeyOracleConfig::FIXED)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_falls_back_to_stratum() {
        let factory = DefaultOracleFactory::new(Path::new("/nonexistent/deeptemp-k16-3.onnx"));
        assert_eq!(factory.backend(), TempoBackend::Stratum);
        assert_eq!(factory.tempo_oracle().unwrap().name(), "stratum-dsp");
        assert_eq!(factory.key_oracle().unwrap().name(), "hpcp");
    }
}
