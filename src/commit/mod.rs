//! Committing analysis results to the library on disk

mod committer;

pub use committer::{CommitOutcome, TrackCommitter};
