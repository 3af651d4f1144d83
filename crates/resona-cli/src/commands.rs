//! Command implementations
//!
//! Each command decodes audio at the adapter boundary, calls the engine,
//! and hands the outcome to the output module. The engine never sees file
//! paths or WAV details.

use std::path::Path;

use anyhow::{bail, Context, Result};
use resona_core::{analysis, find_peaks, pair_peaks, Engine, EngineConfig, Spectrogram};
use tracing::debug;

use crate::output;

pub fn add(db: &Path, file: &Path, id: Option<&str>, json: bool) -> Result<()> {
    let engine = open_engine(db)?;
    let (samples, sr) = load_wav(file)?;
    check_rate(engine.config(), sr, file)?;

    let id = match id {
        Some(id) => id.to_string(),
        None => file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording".to_string()),
    };

    let outcome = engine.add(&id, &samples, sr)?;
    output::print_add(&id, &outcome, json)
}

pub fn recognize(db: &Path, file: &Path, json: bool) -> Result<()> {
    let engine = open_engine(db)?;
    let (samples, sr) = load_wav(file)?;
    check_rate(engine.config(), sr, file)?;

    let result = engine.recognize(&samples, sr)?;
    output::print_recognition(&result, json)
}

pub fn list(db: &Path, json: bool) -> Result<()> {
    let engine = open_engine(db)?;
    let catalog = engine.list()?;
    output::print_catalog(&catalog, json)
}

pub fn stats(db: &Path, json: bool) -> Result<()> {
    let engine = open_engine(db)?;
    let stats = engine.stats()?;
    output::print_stats(&stats, json)
}

pub fn inspect(file: &Path, json: bool) -> Result<()> {
    let config = EngineConfig::default();
    let (samples, sr) = load_wav(file)?;
    check_rate(&config, sr, file)?;

    let spectrogram = Spectrogram::compute(&samples, &config);
    let peaks = find_peaks(&spectrogram, &config);
    let fingerprints = pair_peaks(&peaks, &config).len();
    let peak_stats = analysis::peak_stats(&spectrogram, &peaks);
    let snr_db = analysis::estimate_snr(&samples, &config);
    let duration_seconds = samples.len() as f64 / sr as f64;

    output::print_inspection(file, duration_seconds, snr_db, &peak_stats, fingerprints, json)
}

fn open_engine(db: &Path) -> Result<Engine> {
    Ok(Engine::open(EngineConfig::default(), db)?)
}

/// Decode a WAV file to mono f32 samples plus the file's sample rate.
/// Multi-channel audio is downmixed by channel mean.
fn load_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    debug!(?spec, path = %path.display(), "wav opened");

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .context("corrupt wav data")?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .context("corrupt wav data")?
        }
    };

    let channels = spec.channels as usize;
    let mono = if channels <= 1 {
        samples
    } else {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok((mono, spec.sample_rate))
}

fn check_rate(config: &EngineConfig, sr: u32, path: &Path) -> Result<()> {
    if sr != config.sr {
        bail!(
            "{} is sampled at {} Hz but the index expects {} Hz; resample first \
             (e.g. ffmpeg -i input.wav -ar {} output.wav)",
            path.display(),
            sr,
            config.sr,
            config.sr
        );
    }
    Ok(())
}
