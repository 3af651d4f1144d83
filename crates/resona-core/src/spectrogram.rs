//! Magnitude spectrogram computation
//!
//! Hann-windowed short-time Fourier transform with centered frames, with
//! magnitudes converted to decibels relative to the loudest cell.

use ndarray::Array2;
use num_complex::Complex32;
use realfft::RealFftPlanner;

use crate::config::EngineConfig;

/// Quietest representable cell in dB
pub const DB_FLOOR: f32 = -80.0;

/// Magnitude guard against log of zero
const AMIN: f32 = 1e-5;

/// A magnitude spectrogram in dB, normalized so the loudest cell sits at
/// 0 dB. Shape is `(freq_bins, frames)` with `freq_bins = n_fft / 2 + 1`.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    data: Array2<f32>,
}

impl Spectrogram {
    /// Compute the spectrogram of a mono signal.
    ///
    /// Frame `t` is centered at sample `t * hop` and the signal is
    /// zero-padded at both ends, so `frames = ceil(len / hop)`. An input too
    /// short for a single frame yields an empty spectrogram, not an error.
    pub fn compute(samples: &[f32], config: &EngineConfig) -> Self {
        let mut data = magnitudes(samples, config);
        to_db(&mut data);
        Self { data }
    }

    /// Number of frequency bins (rows)
    pub fn freq_bins(&self) -> usize {
        self.data.nrows()
    }

    /// Number of STFT frames (columns)
    pub fn frames(&self) -> usize {
        self.data.ncols()
    }

    /// True when the input produced no frames
    pub fn is_empty(&self) -> bool {
        self.data.ncols() == 0
    }

    /// Cell value in dB at (frequency bin, frame)
    pub fn value(&self, freq: usize, time: usize) -> f32 {
        self.data[[freq, time]]
    }

    /// The underlying dB matrix
    pub fn db(&self) -> &Array2<f32> {
        &self.data
    }

    #[cfg(test)]
    pub(crate) fn from_db(data: Array2<f32>) -> Self {
        Self { data }
    }
}

/// Linear magnitude STFT, shape `(freq_bins, frames)`.
pub(crate) fn magnitudes(samples: &[f32], config: &EngineConfig) -> Array2<f32> {
    let n_fft = config.n_fft;
    let hop = config.hop();
    let frames = samples.len().div_ceil(hop);
    let mut data = Array2::zeros((config.freq_bins(), frames));
    if frames == 0 {
        return data;
    }

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let window = hann(n_fft);
    let mut input = fft.make_input_vec();
    let mut output: Vec<Complex32> = fft.make_output_vec();

    let half = (n_fft / 2) as isize;
    for t in 0..frames {
        let center = (t * hop) as isize;
        for (i, slot) in input.iter_mut().enumerate() {
            let idx = center - half + i as isize;
            let sample = if idx >= 0 && (idx as usize) < samples.len() {
                samples[idx as usize]
            } else {
                0.0
            };
            *slot = sample * window[i];
        }

        fft.process(&mut input, &mut output)
            .expect("FFT buffer lengths match the plan");
        for (f, bin) in output.iter().enumerate() {
            data[[f, t]] = bin.norm();
        }
    }

    data
}

/// Periodic Hann window of length `n`
fn hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / n as f32).cos()))
        .collect()
}

/// In-place `20 * log10(|X| / max)` with the floor at [`DB_FLOOR`].
///
/// A signal whose global maximum is at or below [`AMIN`] (silence, for all
/// practical purposes) renders at the floor everywhere, which downstream
/// peak picking treats as peakless.
fn to_db(data: &mut Array2<f32>) {
    let max = data.iter().copied().fold(0.0f32, f32::max);
    if max <= AMIN {
        data.fill(DB_FLOOR);
        return;
    }

    let ref_db = 20.0 * max.log10();
    data.mapv_inplace(|v| {
        let db = 20.0 * v.max(AMIN).log10() - ref_db;
        db.max(DB_FLOOR)
    });
}
