//! Audio decoding using symphonia
//!
//! Decodes audio files to mono f32 samples at the analysis sample rate.
//! Uses rubato for resampling with proper anti-aliasing.

use crate::error::{BeatprefixError, Result};
use crate::types::AudioBuffer;
use rubato::{FftFixedInOut, Resampler};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Maximum file size we'll attempt to decode (2GB)
const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Frames per rubato chunk
const RESAMPLE_CHUNK: usize = 1024;

/// Decode an audio file to a mono AudioBuffer at `sample_rate`
pub fn decode(path: &Path, sample_rate: u32) -> Result<AudioBuffer> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| BeatprefixError::decode_error(path, format!("Failed to read file metadata: {}", e)))?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(BeatprefixError::decode_error(
            path,
            format!(
                "File too large ({:.1} GB). Maximum supported size is 2 GB.",
                metadata.len() as f64 / (1024.0 * 1024.0 * 1024.0)
            ),
        ));
    }

    let (mut format, codec_params, track_id) = open_track(path)?;

    let source_rate = codec_params.sample_rate.unwrap_or(44100);
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(2);

    debug!(
        "Decoding: {} @ {}Hz, {} channels",
        path.display(),
        source_rate,
        channels
    );

    let mono = read_mono(path, format.as_mut(), &codec_params, track_id, channels)?;
    if mono.is_empty() {
        return Err(BeatprefixError::decode_error(path, "No audio samples decoded"));
    }

    let samples = resample(&mono, source_rate, sample_rate);

    debug!(
        "Decoded {} samples ({:.2}s)",
        samples.len(),
        samples.len() as f64 / sample_rate as f64
    );

    Ok(AudioBuffer::new(samples, sample_rate))
}

/// Probe the file and select its first audio track
fn open_track(path: &Path) -> Result<(Box<dyn FormatReader>, CodecParameters, u32)> {
    let file = std::fs::File::open(path)
        .map_err(|e| BeatprefixError::decode_error(path, format!("Failed to open file: {}", e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| BeatprefixError::decode_error(path, format!("Failed to probe format: {}", e)))?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| BeatprefixError::decode_error(path, "No audio tracks found"))?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    Ok((format, codec_params, track_id))
}

/// Decode every packet of `track_id`, averaging channels as we go
fn read_mono(
    path: &Path,
    format: &mut dyn FormatReader,
    codec_params: &CodecParameters,
    track_id: u32,
    channels: usize,
) -> Result<Vec<f32>> {
    let mut decoder = symphonia::default::get_codecs()
        .make(codec_params, &DecoderOptions::default())
        .map_err(|e| BeatprefixError::decode_error(path, format!("Failed to create decoder: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                return Err(BeatprefixError::decode_error(
                    path,
                    format!("Failed to read packet: {}", e),
                ));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                trace!("Skipping corrupted frame: {}", e);
                continue;
            }
            Err(e) => {
                return Err(BeatprefixError::decode_error(path, format!("Decode error: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        mono.extend(to_mono(sample_buf.samples(), channels));
    }

    Ok(mono)
}

/// Convert interleaved multi-channel audio to mono
fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// FFT resampling with rubato, falling back to linear interpolation
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let mut resampler =
        match FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, RESAMPLE_CHUNK, 1) {
            Ok(r) => r,
            Err(e) => {
                debug!("Rubato initialization failed ({}), using fallback", e);
                return resample_linear(samples, from_rate, to_rate);
            }
        };

    let input_frames = resampler.input_frames_next();
    let output_frames = resampler.output_frames_next();
    let ratio = to_rate as f64 / from_rate as f64;
    let mut output = Vec::with_capacity((samples.len() as f64 * ratio).ceil() as usize);

    let mut pos = 0;
    while pos < samples.len() {
        let end = (pos + input_frames).min(samples.len());
        let mut chunk = samples[pos..end].to_vec();
        chunk.resize(input_frames, 0.0);

        match resampler.process(&[chunk], None) {
            Ok(resampled) => {
                if let Some(channel) = resampled.first() {
                    // The final chunk is padded; keep only its share of output
                    let valid = if end - pos < input_frames {
                        ((end - pos) as f64 * ratio).ceil() as usize
                    } else {
                        output_frames
                    };
                    output.extend_from_slice(&channel[..valid.min(channel.len())]);
                }
            }
            Err(e) => {
                debug!("Rubato processing error ({}), using fallback for remaining", e);
                output.extend(resample_linear(&samples[pos..], from_rate, to_rate));
                break;
            }
        }

        pos += input_frames;
    }

    output
}

/// Linear interpolation resampler; may alias
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let step = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / step) as usize;

    (0..output_len)
        .map(|i| {
            let src_pos = i as f64 * step;
            let idx = src_pos as usize;
            let frac = (src_pos - idx as f64) as f32;
            if idx + 1 < samples.len() {
                samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
            } else {
                samples[idx.min(samples.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_to_mono_stereo() {
        let stereo = vec![0.5, 0.3, 0.8, 0.2, 1.0, 0.0];
        let mono = to_mono(&stereo, 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.4).abs() < 0.001);
        assert!((mono[1] - 0.5).abs() < 0.001);
        assert!((mono[2] - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_to_mono_already_mono() {
        let mono = vec![0.5, 0.8, 1.0];
        assert_eq!(to_mono(&mono, 1), mono);
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        assert_eq!(resample(&samples, 11025, 11025), samples);
    }

    #[test]
    fn test_resample_to_analysis_rate() {
        let samples: Vec<f32> = (0..4410).map(|i| i as f32 / 4410.0).collect();
        let result = resample(&samples, 44100, 11025);
        assert!((result.len() as f64 - 1102.5).abs() < 3.0);
    }

    #[test]
    fn test_resample_preserves_sine_amplitude() {
        use std::f32::consts::PI;
        let samples: Vec<f32> = (0..8000)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 44100.0).sin())
            .collect();

        let result = resample(&samples, 44100, 11025);
        let max_val = result.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_val = result.iter().cloned().fold(f32::INFINITY, f32::min);

        assert!(max_val > 0.9, "Max value {} should be > 0.9", max_val);
        assert!(min_val < -0.9, "Min value {} should be < -0.9", min_val);
    }

    #[test]
    fn test_linear_fallback_length() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let result = resample_linear(&samples, 22050, 11025);
        assert!((result.len() as f64 - 50.0).abs() < 2.0);
    }

    #[test]
    fn test_decode_wav_resamples_to_requested_rate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..22050 {
            let s = ((i as f32 * 0.05).sin() * 16000.0) as i16;
            writer.write_sample(s).unwrap();
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let buffer = decode(&path, 11025).unwrap();
        assert_eq!(buffer.sample_rate, 11025);
        assert!((buffer.duration - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noise.flac");
        std::fs::write(&path, b"definitely not flac").unwrap();

        let err = decode(&path, 11025).unwrap_err();
        assert!(matches!(err, BeatprefixError::DecodeError { .. }));
    }
}
