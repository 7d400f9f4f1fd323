//! Long-lived analysis workers
//!
//! A worker pulls jobs off the shared channel until it drains. Its oracles
//! are built on the first job and reused for the rest; if building fails,
//! that job fails and the next job tries again.

use super::JobOutcome;
use crate::analysis::{bpm, key, KeyOracle, OracleFactory, TempoOracle};
use crate::audio::{self, Transcoder};
use crate::commit::TrackCommitter;
use crate::config::Settings;
use crate::discovery::DiscoveredFile;
use crate::error::{BeatprefixError, Result};
use crate::naming::build_prefix;
use crossbeam_channel::{Receiver, Sender};
use indicatif::ProgressBar;
use std::path::PathBuf;
use tracing::{debug, error, warn};

/// Everything workers share for one run
pub(crate) struct WorkerContext<'a> {
    pub settings: &'a Settings,
    pub factory: &'a dyn OracleFactory,
    pub transcoder: &'a dyn Transcoder,
    pub archive_dir: PathBuf,
    pub progress: Option<ProgressBar>,
}

type Oracles = (Box<dyn TempoOracle>, Box<dyn KeyOracle>);

pub(crate) struct Worker<'a> {
    id: usize,
    ctx: &'a WorkerContext<'a>,
    oracles: Option<Oracles>,
}

impl<'a> Worker<'a> {
    pub fn new(id: usize, ctx: &'a WorkerContext<'a>) -> Self {
        Self {
            id,
            ctx,
            oracles: None,
        }
    }

    /// Process jobs until the channel is empty and closed
    pub fn run(mut self, jobs: Receiver<DiscoveredFile>, results: Sender<JobOutcome>) {
        let committer = TrackCommitter::new(
            self.ctx.transcoder,
            &self.ctx.archive_dir,
            self.ctx.settings.bitrate.as_str(),
            self.ctx.settings.target_format,
        );

        for file in jobs.iter() {
            let outcome = match self.process(&file, &committer) {
                Ok(outcome) => outcome,
                Err(e) => {
                    if e.is_recoverable() {
                        warn!("Skipping {}: {}", file.path.display(), e);
                    } else {
                        error!("Failed {}: {}", file.path.display(), e);
                    }
                    JobOutcome::Failed {
                        path: file.path.clone(),
                        error: e,
                    }
                }
            };

            if let Some(ref pb) = self.ctx.progress {
                pb.inc(1);
                pb.set_message(format!(
                    "{}",
                    file.path.file_name().unwrap_or_default().to_string_lossy()
                ));
            }

            if results.send(outcome).is_err() {
                break;
            }
        }

        debug!("Worker {} finished", self.id);
    }

    fn process(&mut self, file: &DiscoveredFile, committer: &TrackCommitter<'_>) -> Result<JobOutcome> {
        debug!("Worker {} analyzing: {}", self.id, file.path.display());
        let settings = self.ctx.settings;

        let buffer = audio::decode(&file.path, settings.sample_rate)?;
        let (tempo_oracle, key_oracle) = self.oracles()?;

        let candidates = tempo_oracle
            .estimate(&buffer)
            .map_err(|e| e.with_path(&file.path))?;
        let bpm = bpm::resolve(&candidates, settings.bpm_bounds);

        let estimate = key::resolve(key_oracle, &buffer).map_err(|e| e.with_path(&file.path))?;
        drop(buffer);

        let code = estimate.camelot();
        if !code.is_mapped() {
            warn!(
                "No Camelot code for key '{}' in {}",
                estimate.label(),
                file.path.display()
            );
        }
        let prefix = build_prefix(bpm, &code);
        debug!(
            "{}: BPM={:.1}, Key={} -> {}",
            file.path.file_name().unwrap_or_default().to_string_lossy(),
            bpm,
            estimate.label(),
            prefix
        );

        let commit = committer.commit(&file.path, &prefix)?;

        Ok(JobOutcome::Committed {
            source: file.path.clone(),
            prefix,
            commit,
        })
    }

    /// This worker's oracles, built on first use
    fn oracles(&mut self) -> Result<(&mut dyn TempoOracle, &mut dyn KeyOracle)> {
        if self.oracles.is_none() {
            self.oracles = Some(build_oracles(self.ctx.factory)?);
            debug!("Worker {} built its oracles", self.id);
        }

        match self.oracles.as_mut() {
            Some((tempo, key)) => Ok((tempo.as_mut(), key.as_mut())),
            None => Err(BeatprefixError::ModelUnavailable {
                reason: "Oracles were not initialized".to_string(),
            }),
        }
    }
}

fn build_oracles(factory: &dyn OracleFactory) -> Result<Oracles> {
    let unavailable = |e: BeatprefixError| match e {
        e @ BeatprefixError::ModelUnavailable { .. } => e,
        other => BeatprefixError::ModelUnavailable {
            reason: other.to_string(),
        },
    };

    let tempo = factory.tempo_oracle().map_err(unavailable)?;
    let key = factory.key_oracle().map_err(unavailable)?;
    Ok((tempo, key))
}
