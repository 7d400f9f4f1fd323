//! Configuration: CLI parsing and per-run settings

pub mod cli;
pub mod settings;

pub use cli::Cli;
pub use settings::{Settings, ANALYSIS_SAMPLE_RATE};
