//! Engine facade
//!
//! Owns the live index behind a reader-writer lock, orchestrates the
//! ingest and query pipelines, and keeps the index durable through a
//! write-temp-then-rename snapshot store. Construct one engine per process
//! and hand it to adapters; queries take the lock shared for their whole
//! run, writers are serialized.

use std::fs;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::fingerprint;
use crate::index::{HashIndex, IndexStats};
use crate::interpret::{interpret, Recognition};
use crate::matcher;

/// Outcome of an ingest call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddOutcome {
    pub added: bool,
    pub fingerprint_count: usize,
}

/// One row of [`Engine::list`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingSummary {
    pub id: String,
    pub fingerprint_count: u64,
    pub duration_seconds: f64,
}

/// Catalog of indexed recordings plus index totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub recordings: Vec<RecordingSummary>,
    pub total_recordings: usize,
    pub total_hashes: usize,
}

/// The recognition engine: a validated configuration, the hash index, and
/// an optional durable store.
pub struct Engine {
    config: EngineConfig,
    index: RwLock<HashIndex>,
    store: Option<PathBuf>,
}

impl Engine {
    /// Build an in-memory engine.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            index: RwLock::new(HashIndex::new()),
            store: None,
        })
    }

    /// Build an engine backed by a snapshot file.
    ///
    /// A missing file starts an empty index. An unreadable or incompatible
    /// snapshot also starts empty, with the reason logged; the file on disk
    /// stays untouched until the next successful ingest overwrites it.
    pub fn open(config: EngineConfig, store: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;
        let store = store.into();

        let index = match fs::read(&store) {
            Ok(bytes) => match HashIndex::restore(&bytes, &config) {
                Ok(index) => {
                    let stats = index.stats();
                    info!(
                        path = %store.display(),
                        hashes = stats.hash_count,
                        recordings = stats.recording_count,
                        "index store loaded"
                    );
                    index
                }
                Err(err) => {
                    warn!(path = %store.display(), error = %err, "index store unusable, starting empty");
                    HashIndex::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %store.display(), "no index store yet, starting empty");
                HashIndex::new()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            config,
            index: RwLock::new(index),
            store: Some(store),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fingerprint a recording, add it to the index, and persist.
    ///
    /// The DSP runs before the lock is taken; only the insert and the store
    /// write hold it. Empty input is not an error: the recording is indexed
    /// with zero fingerprints.
    pub fn add(&self, id: &str, samples: &[f32], sr: u32) -> Result<AddOutcome> {
        self.check_rate(sr)?;

        let fingerprints = fingerprint::extract(samples, &self.config);
        let duration_seconds = samples.len() as f64 / sr as f64;

        let mut index = self.write_index()?;
        index.insert(id, &fingerprints, duration_seconds)?;
        self.persist(&index)?;
        info!(
            id,
            fingerprints = fingerprints.len(),
            duration_seconds,
            "recording indexed"
        );

        Ok(AddOutcome {
            added: true,
            fingerprint_count: fingerprints.len(),
        })
    }

    /// Identify a clip against the index.
    pub fn recognize(&self, samples: &[f32], sr: u32) -> Result<Recognition> {
        self.check_rate(sr)?;
        if samples.is_empty() {
            return Ok(Recognition::no_match("empty input", 0));
        }

        let query = fingerprint::extract(samples, &self.config);
        debug!(fingerprints = query.len(), "query extracted");

        let index = self.read_index()?;
        let result = match matcher::best_alignment(&query, &index) {
            Some(candidate) => {
                let song = index.meta(candidate.recording).map(|m| m.id.as_str());
                interpret(song, Some(candidate.offset), candidate.score, &self.config)
            }
            None => interpret(None, None, 0, &self.config),
        };
        Ok(result)
    }

    /// List indexed recordings with index totals.
    pub fn list(&self) -> Result<Catalog> {
        let index = self.read_index()?;
        let recordings = index
            .recordings()
            .iter()
            .map(|meta| RecordingSummary {
                id: meta.id.clone(),
                fingerprint_count: meta.fingerprint_count,
                duration_seconds: meta.duration_seconds,
            })
            .collect();

        let stats = index.stats();
        Ok(Catalog {
            recordings,
            total_recordings: stats.recording_count,
            total_hashes: stats.hash_count,
        })
    }

    pub fn stats(&self) -> Result<IndexStats> {
        Ok(self.read_index()?.stats())
    }

    /// Serialize the live index to snapshot bytes.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        self.read_index()?.snapshot(&self.config)
    }

    /// Replace the live index from snapshot bytes and persist. The previous
    /// index stays intact on any failure.
    pub fn restore(&self, bytes: &[u8]) -> Result<()> {
        let restored = HashIndex::restore(bytes, &self.config)?;
        let mut index = self.write_index()?;
        *index = restored;
        self.persist(&index)
    }

    fn check_rate(&self, sr: u32) -> Result<()> {
        if sr != self.config.sr {
            return Err(Error::SampleRateMismatch {
                expected: self.config.sr,
                got: sr,
            });
        }
        Ok(())
    }

    /// Write the snapshot to a sibling temp file, then rename over the
    /// store, so a failed write never clobbers the previous snapshot.
    fn persist(&self, index: &HashIndex) -> Result<()> {
        let Some(path) = &self.store else {
            return Ok(());
        };

        let bytes = index.snapshot(&self.config)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "index store written");
        Ok(())
    }

    fn read_index(&self) -> Result<RwLockReadGuard<'_, HashIndex>> {
        self.index
            .read()
            .map_err(|_| Error::Internal("index lock poisoned".to_string()))
    }

    fn write_index(&self) -> Result<RwLockWriteGuard<'_, HashIndex>> {
        self.index
            .write()
            .map_err(|_| Error::Internal("index lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_fatal() {
        let config = EngineConfig { n_fft: 0, ..Default::default() };
        assert!(matches!(Engine::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_mismatched_sample_rate() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let err = engine.add("r", &[0.0; 512], 48_000).unwrap_err();
        assert!(matches!(err, Error::SampleRateMismatch { expected: 44_100, got: 48_000 }));
        assert!(engine.recognize(&[0.0; 512], 48_000).is_err());
    }

    #[test]
    fn empty_ingest_registers_with_zero_fingerprints() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let outcome = engine.add("empty", &[], 44_100).unwrap();
        assert_eq!(outcome.fingerprint_count, 0);

        let catalog = engine.list().unwrap();
        assert_eq!(catalog.recordings.len(), 1);
        assert_eq!(catalog.recordings[0].id, "empty");
        assert_eq!(catalog.recordings[0].fingerprint_count, 0);
    }

    #[test]
    fn empty_query_is_a_non_match() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let result = engine.recognize(&[], 44_100).unwrap();
        assert!(!result.matched);
        assert_eq!(result.raw_score, 0);
        assert_eq!(result.message.as_deref(), Some("empty input"));
    }

    #[test]
    fn duplicate_id_surfaces_from_the_index() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        engine.add("r", &[0.0; 1024], 44_100).unwrap();
        let err = engine.add("r", &[0.0; 1024], 44_100).unwrap_err();
        assert!(matches!(err, Error::RecordingExists { .. }));
    }
}
