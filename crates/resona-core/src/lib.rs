//! Resona Core - Acoustic Fingerprinting Engine
//!
//! This crate turns raw mono audio into compact spectral fingerprints and
//! answers "does this clip appear in any indexed recording, and where?":
//! - Magnitude spectrogram (Hann STFT, dB relative to the loudest cell)
//! - Constellation extraction via banded local-maximum filtering
//! - Anchor/target fingerprint hashing with bounded fan-out
//! - Multi-recording hash index with versioned snapshot/restore
//! - Offset-vote matching and confidence interpretation
//!
//! # Architecture
//!
//! ```text
//! ingest:  samples ──▶ Spectrogram ──▶ find_peaks ──▶ pair_peaks ──▶ HashIndex
//!
//! query:   samples ──▶ Spectrogram ──▶ find_peaks ──▶ pair_peaks ─┐
//!                                                                 ▼
//!                         Recognition ◀── interpret ◀── best_alignment(HashIndex)
//! ```
//!
//! The [`Engine`] facade wires both pipelines over one shared index behind
//! a reader-writer lock and keeps it durable through snapshot files.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use resona_core::{Engine, EngineConfig};
//!
//! fn main() -> resona_core::Result<()> {
//!     let engine = Engine::open(EngineConfig::default(), "resona.db")?;
//!
//!     let recording: Vec<f32> = load_samples("song.wav");
//!     engine.add("song", &recording, 44_100)?;
//!
//!     let clip: Vec<f32> = load_samples("clip.wav");
//!     let result = engine.recognize(&clip, 44_100)?;
//!     if result.matched {
//!         println!("{} at {}", result.song.unwrap(), result.position_in_song.unwrap());
//!     }
//!     Ok(())
//! }
//! # fn load_samples(_path: &str) -> Vec<f32> { Vec::new() }
//! ```

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod interpret;
pub mod matcher;
pub mod peaks;
pub mod spectrogram;

pub use config::EngineConfig;
pub use engine::{AddOutcome, Catalog, Engine, RecordingSummary};
pub use error::{Error, Result};
pub use fingerprint::{extract, pair_peaks, Fingerprint, HashKey};
pub use index::{HashIndex, IndexStats, Posting, RecordingId, RecordingMeta, SNAPSHOT_VERSION};
pub use interpret::{format_position, Confidence, Recognition};
pub use matcher::{best_alignment, Candidate};
pub use peaks::{find_peaks, Peak};
pub use spectrogram::Spectrogram;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the engine library
pub fn init() {
    tracing::info!(version = VERSION, "Resona Core initialized");
}
