//! Constellation extraction
//!
//! Finds local maxima of the dB spectrogram with a rectangular neighborhood
//! filter, applied independently to contiguous frequency bands. Banding
//! keeps one loud band (bass, typically) from suppressing peaks across the
//! rest of the spectrum via the shared maximum filter.

use ndarray::Array2;

use crate::config::EngineConfig;
use crate::spectrogram::Spectrogram;

/// A spectral peak at (frame, frequency bin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Peak {
    /// STFT frame
    pub time: u32,
    /// Frequency bin
    pub freq: u32,
}

/// Extract the peak constellation, sorted by time ascending, ties by
/// frequency ascending.
///
/// A cell is a peak iff it equals the maximum of its
/// `freq_neighborhood x time_neighborhood` window within its band and its
/// value exceeds `amplitude_threshold`.
pub fn find_peaks(spec: &Spectrogram, config: &EngineConfig) -> Vec<Peak> {
    let bins = spec.freq_bins();
    if spec.is_empty() || bins == 0 {
        return Vec::new();
    }

    // equal integer bands, the last absorbing the remainder
    let band_size = bins / config.num_bands;
    let mut peaks = Vec::new();

    for b in 0..config.num_bands {
        let f_start = b * band_size;
        let f_end = if b == config.num_bands - 1 { bins } else { (b + 1) * band_size };
        collect_band_peaks(spec, config, f_start, f_end, &mut peaks);
    }

    peaks.sort_unstable();
    peaks
}

/// Banded maximum filter.
///
/// Neighborhood windows are clamped to the band bounds. For a maximum
/// filter whose padding never exceeds the window, this is value-equivalent
/// to reflect padding: every mirrored cell duplicates a cell that is
/// already inside the clamped window. A window of size `k` spans offsets
/// `[-k/2, k - k/2 - 1]` around the cell.
fn collect_band_peaks(
    spec: &Spectrogram,
    config: &EngineConfig,
    f_start: usize,
    f_end: usize,
    out: &mut Vec<Peak>,
) {
    let frames = spec.frames();
    let height = f_end - f_start;
    let t_lag = config.time_neighborhood / 2;
    let t_lead = config.time_neighborhood - t_lag - 1;
    let f_lag = config.freq_neighborhood / 2;
    let f_lead = config.freq_neighborhood - f_lag - 1;

    // separable filter: first the running maximum along the time axis
    let mut row_max = Array2::<f32>::zeros((height, frames));
    for f in 0..height {
        for t in 0..frames {
            let lo = t.saturating_sub(t_lag);
            let hi = (t + t_lead).min(frames - 1);
            let mut m = f32::NEG_INFINITY;
            for tt in lo..=hi {
                m = m.max(spec.value(f_start + f, tt));
            }
            row_max[[f, t]] = m;
        }
    }

    // then along the frequency axis, clamped to the band
    for f in 0..height {
        let lo = f.saturating_sub(f_lag);
        let hi = (f + f_lead).min(height - 1);
        for t in 0..frames {
            let mut m = f32::NEG_INFINITY;
            for ff in lo..=hi {
                m = m.max(row_max[[ff, t]]);
            }
            let v = spec.value(f_start + f, t);
            if v == m && v > config.amplitude_threshold {
                out.push(Peak {
                    time: t as u32,
                    freq: (f_start + f) as u32,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrogram::DB_FLOOR;

    /// 9 bins x 12 frames of floor, two bands of 4 and 5 bins
    fn test_config() -> EngineConfig {
        EngineConfig {
            n_fft: 16,
            hop_ratio: 4,
            num_bands: 2,
            freq_neighborhood: 3,
            time_neighborhood: 3,
            ..Default::default()
        }
    }

    fn floor_spec(bins: usize, frames: usize) -> Array2<f32> {
        Array2::from_elem((bins, frames), DB_FLOOR)
    }

    #[test]
    fn lone_maximum_is_a_peak() {
        let config = test_config();
        let mut db = floor_spec(9, 12);
        db[[2, 5]] = -10.0;

        let peaks = find_peaks(&Spectrogram::from_db(db), &config);
        assert_eq!(peaks, vec![Peak { time: 5, freq: 2 }]);
    }

    #[test]
    fn quiet_maximum_stays_below_threshold() {
        let config = test_config();
        let mut db = floor_spec(9, 12);
        db[[2, 5]] = -40.0; // a local max, but under the -35 dB gate

        assert!(find_peaks(&Spectrogram::from_db(db), &config).is_empty());
    }

    #[test]
    fn neighborhood_suppresses_weaker_cells() {
        let config = test_config();
        let mut db = floor_spec(9, 12);
        db[[2, 5]] = -10.0;
        db[[3, 6]] = -20.0; // inside the 3x3 window of the louder cell

        let peaks = find_peaks(&Spectrogram::from_db(db), &config);
        assert_eq!(peaks, vec![Peak { time: 5, freq: 2 }]);
    }

    #[test]
    fn bands_are_filtered_independently() {
        let config = EngineConfig {
            freq_neighborhood: 5,
            ..test_config()
        };
        let mut db = floor_spec(9, 12);
        db[[3, 5]] = -10.0; // top of band 0
        db[[4, 5]] = -30.0; // bottom of band 1, would be suppressed unbanded

        let peaks = find_peaks(&Spectrogram::from_db(db), &config);
        assert_eq!(
            peaks,
            vec![Peak { time: 5, freq: 3 }, Peak { time: 5, freq: 4 }]
        );
    }

    #[test]
    fn peaks_sort_by_time_then_frequency() {
        let config = test_config();
        let mut db = floor_spec(9, 12);
        db[[7, 9]] = -10.0;
        db[[1, 9]] = -10.0;
        db[[5, 2]] = -10.0;

        let peaks = find_peaks(&Spectrogram::from_db(db), &config);
        assert_eq!(
            peaks,
            vec![
                Peak { time: 2, freq: 5 },
                Peak { time: 9, freq: 1 },
                Peak { time: 9, freq: 7 },
            ]
        );
    }

    #[test]
    fn empty_spectrogram_has_no_peaks() {
        let config = test_config();
        let spec = Spectrogram::compute(&[], &config);
        assert!(find_peaks(&spec, &config).is_empty());
    }
}
