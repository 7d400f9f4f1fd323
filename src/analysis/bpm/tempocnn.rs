//! ONNX Runtime based TempoCNN oracle
//!
//! Classifies log-mel spectrogram patches into 256 tempo classes
//! (30-285 BPM). Each patch yields one candidate; the fallback is the
//! majority vote over all patches.

use crate::analysis::spectral::{mel_filterbank, Stft};
use crate::analysis::traits::TempoOracle;
use crate::error::{BeatprefixError, Result};
use crate::types::{AudioBuffer, TempoCandidate, TempoCandidates};
use ndarray::Array3;
use ort::session::Session;
use ort::value::Tensor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sample rate the model was trained at
pub const MODEL_SAMPLE_RATE: u32 = 11025;

const FRAME_SIZE: usize = 1024;
const HOP_SIZE: usize = 512;
const MEL_BANDS: usize = 40;
const MEL_MIN_HZ: f32 = 20.0;
const MEL_MAX_HZ: f32 = 5000.0;

/// Frames per model input patch (~11.9s)
pub const PATCH_FRAMES: usize = 256;
/// Frames between patch starts
pub const PATCH_HOP: usize = 128;

const NUM_CLASSES: usize = 256;
/// BPM of class 0
const MIN_CLASS_BPM: f64 = 30.0;

/// Tempo oracle running a TempoCNN model through ONNX Runtime
pub struct TempoCnnOracle {
    session: Session,
    input_name: String,
    stft: Stft,
    filterbank: Vec<Vec<f32>>,
}

impl TempoCnnOracle {
    /// Load the model and build the mel front end
    pub fn load(model_path: &Path) -> Result<Self> {
        let session = Self::create_session(model_path)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| BeatprefixError::ModelUnavailable {
                reason: "Model has no input tensors defined".to_string(),
            })?;

        info!("TempoCNN model loaded: {}", model_path.display());

        Ok(Self {
            session,
            input_name,
            stft: Stft::new(FRAME_SIZE, HOP_SIZE),
            filterbank: mel_filterbank(
                MEL_BANDS,
                FRAME_SIZE,
                MODEL_SAMPLE_RATE,
                MEL_MIN_HZ,
                MEL_MAX_HZ,
            ),
        })
    }

    fn create_session(model_path: &Path) -> Result<Session> {
        use ort::execution_providers::CPUExecutionProvider;

        if !model_path.exists() {
            return Err(BeatprefixError::ModelUnavailable {
                reason: format!("Model file not found: {}", model_path.display()),
            });
        }

        Session::builder()
            .map_err(|e| BeatprefixError::ModelUnavailable {
                reason: format!("Failed to create ORT session builder: {}", e),
            })?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(|e| BeatprefixError::ModelUnavailable {
                reason: format!("Failed to configure CPU provider: {}", e),
            })?
            .commit_from_file(model_path)
            .map_err(|e| BeatprefixError::ModelUnavailable {
                reason: format!("Failed to load model {}: {}", model_path.display(), e),
            })
    }

    /// Log-compressed mel spectrogram, `[frames][bands]`
    fn mel_spectrogram(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        let frame_size = self.stft.frame_size() as f32;
        self.stft
            .power_frames(samples)
            .into_iter()
            .map(|power| {
                let magnitude: Vec<f32> = power.iter().map(|p| (p * frame_size).sqrt()).collect();
                self.filterbank
                    .iter()
                    .map(|filter| {
                        let energy: f32 = filter
                            .iter()
                            .zip(magnitude.iter())
                            .map(|(c, m)| c * m)
                            .sum();
                        (1.0 + 10000.0 * energy).log10()
                    })
                    .collect()
            })
            .collect()
    }

    /// Class probabilities for one patch
    fn classify(&mut self, patch: Array3<f32>) -> Result<Vec<f32>> {
        let tensor = Tensor::from_array(patch).map_err(|e| analysis_error(e, "create input tensor"))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| analysis_error(e, "run inference"))?;

        let output = outputs
            .iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| BeatprefixError::AnalysisError {
                path: PathBuf::new(),
                reason: "No output tensor from model".to_string(),
            })?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| analysis_error(e, "extract output tensor"))?;

        if data.len() != NUM_CLASSES {
            return Err(BeatprefixError::AnalysisError {
                path: PathBuf::new(),
                reason: format!(
                    "Expected {} tempo classes, model returned {}",
                    NUM_CLASSES,
                    data.len()
                ),
            });
        }

        Ok(data.to_vec())
    }
}

fn analysis_error(e: impl std::fmt::Display, step: &str) -> BeatprefixError {
    BeatprefixError::AnalysisError {
        path: PathBuf::new(),
        reason: format!("Failed to {}: {}", step, e),
    }
}

impl TempoOracle for TempoCnnOracle {
    fn estimate(&mut self, buffer: &AudioBuffer) -> Result<TempoCandidates> {
        if buffer.sample_rate != MODEL_SAMPLE_RATE {
            return Err(BeatprefixError::AnalysisError {
                path: PathBuf::new(),
                reason: format!(
                    "TempoCNN expects {}Hz audio, got {}Hz",
                    MODEL_SAMPLE_RATE, buffer.sample_rate
                ),
            });
        }

        let spectrogram = self.mel_spectrogram(&buffer.samples);
        if spectrogram.is_empty() {
            return Err(BeatprefixError::AnalysisError {
                path: PathBuf::new(),
                reason: "Audio too short for tempo estimation".to_string(),
            });
        }

        let starts = patch_starts(spectrogram.len());
        debug!(
            "TempoCNN: {} frames, {} patches",
            spectrogram.len(),
            starts.len()
        );

        let mut candidates = Vec::with_capacity(starts.len());
        for start in starts {
            let probabilities = self.classify(patch(&spectrogram, start))?;
            candidates.push(candidate_from_probabilities(&probabilities));
        }

        let fallback = majority_bpm(&candidates);
        Ok(TempoCandidates::new(candidates, fallback))
    }

    fn name(&self) -> &'static str {
        "tempocnn"
    }
}

/// Patch start frames; a spectrogram shorter than one patch gets one padded patch
pub fn patch_starts(num_frames: usize) -> Vec<usize> {
    if num_frames <= PATCH_FRAMES {
        return vec![0];
    }
    (0..=num_frames - PATCH_FRAMES).step_by(PATCH_HOP).collect()
}

/// `[1, PATCH_FRAMES, MEL_BANDS]` input starting at `start`, zero-padded past the end
fn patch(spectrogram: &[Vec<f32>], start: usize) -> Array3<f32> {
    let mut input = Array3::<f32>::zeros((1, PATCH_FRAMES, MEL_BANDS));
    for (offset, frame) in spectrogram.iter().skip(start).take(PATCH_FRAMES).enumerate() {
        for (band, &value) in frame.iter().enumerate().take(MEL_BANDS) {
            input[[0, offset, band]] = value;
        }
    }
    input
}

/// (argmax BPM, max probability)
fn candidate_from_probabilities(probabilities: &[f32]) -> TempoCandidate {
    let (class, &p) = probabilities
        .iter()
        .enumerate()
        .fold((0, &f32::NEG_INFINITY), |best, cur| {
            if cur.1 > best.1 {
                cur
            } else {
                best
            }
        });
    TempoCandidate::new(MIN_CLASS_BPM + class as f64, p as f64)
}

/// Most common patch BPM; ties go to the smaller BPM
fn majority_bpm(candidates: &[TempoCandidate]) -> f64 {
    let mut counts = [0usize; NUM_CLASSES];
    for candidate in candidates {
        let class = (candidate.bpm - MIN_CLASS_BPM) as usize;
        if class < NUM_CLASSES {
            counts[class] += 1;
        }
    }
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    MIN_CLASS_BPM + best as f64
}
