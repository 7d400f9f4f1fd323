//! beatprefix - BPM and key prefixes for DJ libraries
//!
//! Walks a music library, estimates tempo and musical key for every track,
//! and prefixes each file name and title tag with `[BPM-Camelot]` (for
//! example `[128-08A] Track.mp3`). Files that are not MP3 are converted to
//! MP3 and their originals are moved into an archive folder that later runs
//! skip.
//!
//! # Architecture
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: Library scanning with archive exclusion
//! - `audio`: Decoding with symphonia, MP3 transcoding through ffmpeg
//! - `analysis`: Tempo and key oracles, BPM resolution, Camelot mapping
//! - `naming`: Bracket-tag cleanup and prefix formatting
//! - `commit`: Rename, retag, transcode and archive one track
//! - `pipeline`: Worker pool orchestration and the run summary
//!
//! # Example
//!
//! ```no_run
//! use beatprefix::{config::Settings, pipeline};
//!
//! let settings = Settings::default();
//! let result = pipeline::run(&settings).expect("Run failed");
//! println!("Prefixed {} tracks", result.successful);
//! ```

pub mod analysis;
pub mod audio;
pub mod commit;
pub mod config;
pub mod discovery;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod types;

// Re-export key types at crate root
pub use error::{BeatprefixError, Result};
pub use types::{AudioBuffer, KeyEstimate, TempoCandidate, TempoCandidates, TrackTags};
