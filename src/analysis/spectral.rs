//! Short-time spectral analysis shared by the oracles
//!
//! Hann-windowed frames transformed with rustfft. The key oracle folds the
//! magnitude spectrum into pitch classes; the TempoCNN oracle applies a mel
//! filterbank on top of the power spectrum.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Reusable STFT plan for one frame size
pub struct Stft {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    frame_size: usize,
    hop_size: usize,
    scratch: Vec<Complex<f32>>,
}

impl Stft {
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);
        Self {
            fft,
            window: hann_window(frame_size),
            frame_size,
            hop_size: hop_size.max(1),
            scratch: vec![Complex::new(0.0, 0.0); frame_size],
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of positive-frequency bins per frame (N/2 + 1)
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Number of full frames that fit in `len` samples
    pub fn num_frames(&self, len: usize) -> usize {
        if len < self.frame_size {
            return 0;
        }
        (len - self.frame_size) / self.hop_size + 1
    }

    /// Power spectrum of every frame, `[frames][bins]`
    pub fn power_frames(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        let num_frames = self.num_frames(samples.len());
        let mut frames = Vec::with_capacity(num_frames);
        for frame_idx in 0..num_frames {
            let start = frame_idx * self.hop_size;
            frames.push(self.power_spectrum(&samples[start..start + self.frame_size]));
        }
        frames
    }

    /// Power spectrum of one frame of exactly `frame_size` samples
    fn power_spectrum(&mut self, frame: &[f32]) -> Vec<f32> {
        for (i, (&sample, &w)) in frame.iter().zip(self.window.iter()).enumerate() {
            self.scratch[i] = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let norm = self.frame_size as f32;
        self.scratch[..self.num_bins()]
            .iter()
            .map(|c| c.norm_sqr() / norm)
            .collect()
    }
}

/// Generate a Hann window of given size
pub fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Frequency in Hz of an FFT bin
pub fn bin_frequency(bin: usize, frame_size: usize, sample_rate: u32) -> f32 {
    bin as f32 * sample_rate as f32 / frame_size as f32
}

/// Triangular mel filterbank between `f_min` and `f_max`, `[bands][bins]`
pub fn mel_filterbank(
    n_bands: usize,
    frame_size: usize,
    sample_rate: u32,
    f_min: f32,
    f_max: f32,
) -> Vec<Vec<f32>> {
    let n_bins = frame_size / 2 + 1;
    let mel_min = hz_to_mel(f_min);
    let mel_max = hz_to_mel(f_max.min(sample_rate as f32 / 2.0));

    let n_points = n_bands + 2;
    let bin_points: Vec<f32> = (0..n_points)
        .map(|i| mel_min + (mel_max - mel_min) * i as f32 / (n_points - 1) as f32)
        .map(mel_to_hz)
        .map(|hz| hz * frame_size as f32 / sample_rate as f32)
        .collect();

    let mut filterbank = Vec::with_capacity(n_bands);
    for band in 0..n_bands {
        let mut filter = vec![0.0f32; n_bins];
        let left = bin_points[band];
        let center = bin_points[band + 1];
        let right = bin_points[band + 2];

        for (bin, coeff) in filter.iter_mut().enumerate() {
            let bin_f = bin as f32;
            if bin_f >= left && bin_f <= center && (center - left) > 0.0 {
                *coeff = (bin_f - left) / (center - left);
            } else if bin_f > center && bin_f <= right && (right - center) > 0.0 {
                *coeff = (right - bin_f) / (right - center);
            }
        }
        filterbank.push(filter);
    }

    filterbank
}

pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}
