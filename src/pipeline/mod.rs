//! Batch processing of a library

mod orchestrator;
mod worker;

pub use orchestrator::{run, run_with, PipelineResult};

use crate::commit::CommitOutcome;
use crate::error::BeatprefixError;
use crate::naming::TrackPrefix;
use std::path::PathBuf;

/// What happened to one discovered file
#[derive(Debug)]
pub enum JobOutcome {
    Committed {
        /// Path the file was discovered at
        source: PathBuf,
        prefix: TrackPrefix,
        commit: CommitOutcome,
    },
    Failed {
        path: PathBuf,
        error: BeatprefixError,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Committed { .. })
    }
}
