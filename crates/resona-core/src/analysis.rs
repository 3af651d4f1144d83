//! Signal analysis helpers
//!
//! Diagnostics surfaced alongside ingest: a broadband SNR estimate and the
//! amplitude distribution of a constellation. Neither feeds the matching
//! path.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::peaks::Peak;
use crate::spectrogram::{self, Spectrogram};

/// SNR reported for a signal with no measurable noise floor, dB
const SNR_CLEAN: f32 = 100.0;

/// Amplitude distribution of a constellation over its spectrogram, dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakStats {
    pub total_peaks: usize,
    pub mean_amplitude: f32,
    pub std_amplitude: f32,
    pub min_amplitude: f32,
    pub max_amplitude: f32,
}

/// Estimate the signal-to-noise ratio of a mono signal in dB.
///
/// Magnitudes are averaged over time per frequency bin; signal power is
/// taken as the strongest bin mean and noise power as the median, on the
/// assumption that background noise is broadband. A signal with no noise
/// floor reports 100 dB.
pub fn estimate_snr(samples: &[f32], config: &EngineConfig) -> f32 {
    let mags = spectrogram::magnitudes(samples, config);
    if mags.ncols() == 0 {
        return SNR_CLEAN;
    }

    let mut bin_means: Vec<f32> = mags
        .rows()
        .into_iter()
        .map(|row| row.mean().unwrap_or(0.0))
        .collect();

    let signal = bin_means.iter().copied().fold(0.0f32, f32::max);
    let noise = median(&mut bin_means);
    if noise <= 0.0 {
        return SNR_CLEAN;
    }

    10.0 * (signal / noise).log10()
}

/// Summarize the amplitudes of a constellation.
pub fn peak_stats(spec: &Spectrogram, peaks: &[Peak]) -> PeakStats {
    if peaks.is_empty() {
        return PeakStats {
            total_peaks: 0,
            mean_amplitude: 0.0,
            std_amplitude: 0.0,
            min_amplitude: 0.0,
            max_amplitude: 0.0,
        };
    }

    let amplitudes: Vec<f32> = peaks
        .iter()
        .map(|p| spec.value(p.freq as usize, p.time as usize))
        .collect();
    let n = amplitudes.len() as f32;
    let mean = amplitudes.iter().sum::<f32>() / n;
    let variance = amplitudes.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n;

    PeakStats {
        total_peaks: amplitudes.len(),
        mean_amplitude: mean,
        std_amplitude: variance.sqrt(),
        min_amplitude: amplitudes.iter().copied().fold(f32::INFINITY, f32::min),
        max_amplitude: amplitudes.iter().copied().fold(f32::NEG_INFINITY, f32::max),
    }
}

/// Median with midpoint interpolation for even lengths. `values` must be
/// non-empty.
fn median(values: &mut [f32]) -> f32 {
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use crate::spectrogram::DB_FLOOR;

    #[test]
    fn tone_over_faint_noise_reads_as_high_snr() {
        let config = EngineConfig::default();
        let sr = config.sr as f32;
        let samples: Vec<f32> = (0..44_100)
            .map(|i| {
                let tone = (std::f32::consts::TAU * 1000.0 * i as f32 / sr).sin() * 0.5;
                let dither = if i % 2 == 0 { 1e-4 } else { -1e-4 };
                tone + dither
            })
            .collect();

        assert!(estimate_snr(&samples, &config) > 20.0);
    }

    #[test]
    fn silence_reads_as_clean() {
        let config = EngineConfig::default();
        assert_eq!(estimate_snr(&vec![0.0; 44_100], &config), SNR_CLEAN);
        assert_eq!(estimate_snr(&[], &config), SNR_CLEAN);
    }

    #[test]
    fn empty_constellation_reports_zeros() {
        let spec = Spectrogram::compute(&[], &EngineConfig::default());
        let stats = peak_stats(&spec, &[]);
        assert_eq!(stats.total_peaks, 0);
        assert_eq!(stats.mean_amplitude, 0.0);
    }

    #[test]
    fn stats_follow_the_peak_amplitudes() {
        let mut db = Array2::from_elem((9, 12), DB_FLOOR);
        db[[2, 5]] = -10.0;
        db[[6, 8]] = -30.0;
        let spec = Spectrogram::from_db(db);

        let peaks = [Peak { time: 5, freq: 2 }, Peak { time: 8, freq: 6 }];
        let stats = peak_stats(&spec, &peaks);

        assert_eq!(stats.total_peaks, 2);
        assert_eq!(stats.mean_amplitude, -20.0);
        assert_eq!(stats.min_amplitude, -30.0);
        assert_eq!(stats.max_amplitude, -10.0);
        assert_eq!(stats.std_amplitude, 10.0);
    }

    #[test]
    fn median_interpolates_even_lengths() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}
