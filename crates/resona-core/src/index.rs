//! Multi-recording hash index
//!
//! Maps (f1, f2, dt) keys to postings of (recording, anchor frame).
//! Recording ids are interned so postings stay compact; per-recording
//! metadata keeps the public id string, fingerprint count, and duration.
//! The index serializes to a versioned, deterministic snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::fingerprint::{Fingerprint, HashKey};

/// Interned recording handle, valid within one index
pub type RecordingId = u32;

/// Bumped whenever the snapshot layout changes; restore refuses other
/// versions.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One stored fingerprint occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub recording: RecordingId,
    /// Anchor frame t1
    pub anchor: u32,
}

/// Per-recording bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMeta {
    /// Caller-supplied opaque id
    pub id: String,
    pub fingerprint_count: u64,
    pub duration_seconds: f64,
}

/// Index-level counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Distinct hash keys
    pub hash_count: usize,
    pub recording_count: usize,
}

/// Reverse index over fingerprint hashes for any number of recordings.
///
/// Lookups are expected O(1) per key; postings within a bucket keep
/// insertion order, which snapshots rely on for determinism.
#[derive(Debug, Default)]
pub struct HashIndex {
    buckets: HashMap<HashKey, Vec<Posting>>,
    recordings: Vec<RecordingMeta>,
    by_id: HashMap<String, RecordingId>,
}

/// On-disk layout. Buckets are sorted by key so the same inserts always
/// produce the same bytes.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    config: EngineConfig,
    recordings: Vec<RecordingMeta>,
    buckets: Vec<(HashKey, Vec<Posting>)>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recording's fingerprints under its id.
    ///
    /// An id that is already indexed is rejected and nothing is written;
    /// accepting it would mix two generations of fingerprints under one
    /// metadata entry.
    pub fn insert(
        &mut self,
        id: &str,
        fingerprints: &[Fingerprint],
        duration_seconds: f64,
    ) -> Result<RecordingId> {
        if self.by_id.contains_key(id) {
            return Err(Error::RecordingExists { id: id.to_string() });
        }

        let recording = self.recordings.len() as RecordingId;
        for fp in fingerprints {
            self.buckets.entry(fp.key).or_default().push(Posting {
                recording,
                anchor: fp.anchor,
            });
        }
        self.recordings.push(RecordingMeta {
            id: id.to_string(),
            fingerprint_count: fingerprints.len() as u64,
            duration_seconds,
        });
        self.by_id.insert(id.to_string(), recording);
        Ok(recording)
    }

    /// Postings under a key; empty when the key is absent.
    pub fn lookup(&self, key: &HashKey) -> &[Posting] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Metadata for an interned recording handle
    pub fn meta(&self, recording: RecordingId) -> Option<&RecordingMeta> {
        self.recordings.get(recording as usize)
    }

    /// All recordings in insertion order
    pub fn recordings(&self) -> &[RecordingMeta] {
        &self.recordings
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            hash_count: self.buckets.len(),
            recording_count: self.recordings.len(),
        }
    }

    /// Serialize buckets and metadata to a deterministic byte stream.
    pub fn snapshot(&self, config: &EngineConfig) -> Result<Vec<u8>> {
        let mut buckets: Vec<(HashKey, Vec<Posting>)> =
            self.buckets.iter().map(|(k, v)| (*k, v.clone())).collect();
        buckets.sort_unstable_by_key(|(key, _)| *key);

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            config: config.clone(),
            recordings: self.recordings.clone(),
            buckets,
        };
        rmp_serde::to_vec_named(&snapshot)
            .map_err(|e| Error::Internal(format!("snapshot encode: {e}")))
    }

    /// Rebuild an index from snapshot bytes.
    ///
    /// Refuses a mismatched snapshot version or a snapshot written under a
    /// different configuration; fingerprints do not transfer across either.
    pub fn restore(bytes: &[u8], config: &EngineConfig) -> Result<Self> {
        let snapshot: Snapshot =
            rmp_serde::from_slice(bytes).map_err(|e| Error::SnapshotDecode(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::SnapshotIncompatible(format!(
                "snapshot version {} does not match engine version {}",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        if snapshot.config != *config {
            return Err(Error::SnapshotIncompatible(
                "snapshot was written under a different configuration".to_string(),
            ));
        }

        let mut index = HashIndex {
            buckets: HashMap::with_capacity(snapshot.buckets.len()),
            recordings: snapshot.recordings,
            by_id: HashMap::new(),
        };
        for (handle, meta) in index.recordings.iter().enumerate() {
            index.by_id.insert(meta.id.clone(), handle as RecordingId);
        }
        for (key, postings) in snapshot.buckets {
            index.buckets.insert(key, postings);
        }

        let stats = index.stats();
        info!(
            hashes = stats.hash_count,
            recordings = stats.recording_count,
            "index restored from snapshot"
        );
        Ok(index)
    }
}
