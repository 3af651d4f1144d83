//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fingerprinting parameters.
///
/// Changing any field invalidates existing snapshots: fingerprints computed
/// under one configuration do not match fingerprints computed under another,
/// so `restore` refuses snapshots written with a different configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sampling rate in Hz
    pub sr: u32,
    /// FFT window size (~46 ms at 44.1 kHz with the default)
    pub n_fft: usize,
    /// Hop length = n_fft / hop_ratio (~11.6 ms steps with the defaults)
    pub hop_ratio: usize,
    /// Frequency-axis neighborhood for the local maximum filter
    pub freq_neighborhood: usize,
    /// Time-axis neighborhood for the local maximum filter
    pub time_neighborhood: usize,
    /// Minimum peak amplitude in dB, relative to the per-signal maximum
    pub amplitude_threshold: f32,
    /// Number of frequency bands for peak distribution
    pub num_bands: usize,
    /// Maximum target peaks per anchor
    pub fanout: usize,
    /// Minimum anchor-to-target distance in frames
    pub dt_min: u32,
    /// Maximum anchor-to-target distance in seconds
    pub dt_max_seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sr: 44_100,
            n_fft: 2048,
            hop_ratio: 4,
            freq_neighborhood: 20,
            time_neighborhood: 20,
            amplitude_threshold: -35.0,
            num_bands: 6,
            fanout: 10,
            dt_min: 2,
            dt_max_seconds: 2.0,
        }
    }
}

impl EngineConfig {
    /// Validate parameter ranges, reporting the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.sr == 0 {
            return Err(Error::config("sr must be positive"));
        }
        if self.n_fft == 0 || !self.n_fft.is_power_of_two() {
            return Err(Error::config("n_fft must be a positive power of 2"));
        }
        if self.hop_ratio == 0 || self.n_fft % self.hop_ratio != 0 {
            return Err(Error::config("hop_ratio must be positive and divide n_fft"));
        }
        if self.freq_neighborhood == 0 {
            return Err(Error::config("freq_neighborhood must be at least 1"));
        }
        if self.time_neighborhood == 0 {
            return Err(Error::config("time_neighborhood must be at least 1"));
        }
        if !self.amplitude_threshold.is_finite() {
            return Err(Error::config("amplitude_threshold must be finite"));
        }
        if self.num_bands == 0 || self.num_bands > self.n_fft / 2 {
            return Err(Error::config("num_bands must be between 1 and n_fft/2"));
        }
        if self.fanout == 0 {
            return Err(Error::config("fanout must be at least 1"));
        }
        if self.dt_max_seconds <= 0.0 {
            return Err(Error::config("dt_max_seconds must be positive"));
        }
        Ok(())
    }

    /// STFT hop length in samples
    pub fn hop(&self) -> usize {
        self.n_fft / self.hop_ratio
    }

    /// Number of frequency bins per STFT frame
    pub fn freq_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Maximum anchor-to-target distance in frames
    pub fn dt_max_frames(&self) -> u32 {
        (self.dt_max_seconds * self.sr as f64 / self.hop() as f64) as u32
    }

    /// Duration of one STFT frame in seconds
    pub fn frame_seconds(&self) -> f64 {
        self.hop() as f64 / self.sr as f64
    }
}
