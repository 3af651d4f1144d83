//! Anchor/target fingerprint generation
//!
//! Combines constellation peaks into (f1, f2, dt) hash keys anchored at the
//! first peak's frame. Keys are time-shift invariant: a clip taken from the
//! middle of a recording produces the same keys, offset in anchor time.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::peaks::{find_peaks, Peak};
use crate::spectrogram::Spectrogram;

/// The lookup key of a fingerprint: anchor bin, target bin, frame delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HashKey {
    /// Anchor frequency bin
    pub f1: u32,
    /// Target frequency bin
    pub f2: u32,
    /// Frames between anchor and target
    pub dt: u32,
}

/// A hash key plus the anchor frame it was observed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub key: HashKey,
    /// Anchor frame t1
    pub anchor: u32,
}

/// Pair peaks into fingerprints under the fan-out and time-delta rules.
///
/// Anchors are visited in (t, f) order and targets scanned in (t, f) order;
/// a target closer than `dt_min` frames is skipped, the scan stops past
/// `dt_max`, and the first `fanout` surviving targets win. This ordering
/// decides which fingerprints are kept under load and therefore the exact
/// index contents; it must not change.
pub fn pair_peaks(peaks: &[Peak], config: &EngineConfig) -> Vec<Fingerprint> {
    let dt_max = config.dt_max_frames();
    let mut fingerprints = Vec::new();

    for (i, anchor) in peaks.iter().enumerate() {
        let mut emitted = 0;
        for target in &peaks[i + 1..] {
            let dt = target.time - anchor.time;
            if dt < config.dt_min {
                continue;
            }
            if dt > dt_max {
                break;
            }

            fingerprints.push(Fingerprint {
                key: HashKey {
                    f1: anchor.freq,
                    f2: target.freq,
                    dt,
                },
                anchor: anchor.time,
            });
            emitted += 1;
            if emitted >= config.fanout {
                break;
            }
        }
    }

    fingerprints
}

/// Full extraction pipeline: samples -> spectrogram -> constellation ->
/// fingerprints. Empty or silent input yields an empty set.
pub fn extract(samples: &[f32], config: &EngineConfig) -> Vec<Fingerprint> {
    let spec = Spectrogram::compute(samples, config);
    let peaks = find_peaks(&spec, config);
    pair_peaks(&peaks, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(time: u32, freq: u32) -> Peak {
        Peak { time, freq }
    }

    /// dt window [2, 10] at the default 512-sample hop; 10.5 frames keeps
    /// the floor away from the rounding boundary
    fn test_config() -> EngineConfig {
        EngineConfig {
            dt_min: 2,
            dt_max_seconds: 10.5 * 512.0 / 44_100.0,
            fanout: 3,
            ..Default::default()
        }
    }

    #[test]
    fn skips_targets_below_dt_min() {
        let config = test_config();
        let peaks = vec![peak(0, 10), peak(1, 20), peak(3, 30)];

        let fps = pair_peaks(&peaks, &config);
        // (0,10) pairs only with (3,30); (1,20) likewise; the tail anchor has no target
        assert_eq!(fps.len(), 2);
        assert_eq!(fps[0].key, HashKey { f1: 10, f2: 30, dt: 3 });
        assert_eq!(fps[0].anchor, 0);
        assert_eq!(fps[1].key, HashKey { f1: 20, f2: 30, dt: 2 });
    }

    #[test]
    fn stops_past_dt_max() {
        let config = test_config();
        let peaks = vec![peak(0, 10), peak(5, 20), peak(11, 30), peak(12, 40)];

        let fps = pair_peaks(&peaks, &config);
        let from_first: Vec<_> = fps.iter().filter(|fp| fp.anchor == 0).collect();
        assert_eq!(from_first.len(), 1, "targets past dt_max must not pair");
        assert_eq!(from_first[0].key.f2, 20);
    }

    #[test]
    fn fanout_caps_each_anchor() {
        let config = test_config();
        let peaks: Vec<Peak> = (0..8).map(|i| peak(i * 2, 100 + i)).collect();

        let fps = pair_peaks(&peaks, &config);
        for anchor in &peaks {
            let emitted = fps.iter().filter(|fp| fp.anchor == anchor.time).count();
            assert!(emitted <= config.fanout, "anchor {} emitted {}", anchor.time, emitted);
        }
        // the first anchor has enough in-window targets to saturate
        assert_eq!(fps.iter().filter(|fp| fp.anchor == 0).count(), config.fanout);
    }

    #[test]
    fn stored_deltas_stay_in_window() {
        let config = test_config();
        let peaks: Vec<Peak> = (0..40).map(|i| peak(i, 50 + (i * 7) % 300)).collect();

        for fp in pair_peaks(&peaks, &config) {
            assert!(fp.key.dt >= config.dt_min);
            assert!(fp.key.dt <= config.dt_max_frames());
        }
    }

    #[test]
    fn ordering_is_reproducible() {
        let config = test_config();
        let peaks: Vec<Peak> = (0..40).map(|i| peak(i / 2, 10 + (i * 13) % 200)).collect();
        let mut sorted = peaks.clone();
        sorted.sort_unstable();

        assert_eq!(pair_peaks(&sorted, &config), pair_peaks(&sorted, &config));
    }

    #[test]
    fn empty_input_extracts_nothing() {
        let config = EngineConfig::default();
        assert!(extract(&[], &config).is_empty());
        assert!(extract(&vec![0.0; 44_100], &config).is_empty());
    }
}
