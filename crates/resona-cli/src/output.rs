//! Output formatting for command results

use std::path::Path;

use anyhow::Result;
use console::style;
use resona_core::analysis::PeakStats;
use resona_core::{format_position, AddOutcome, Catalog, IndexStats, Recognition};
use tabled::{settings::Style, Table, Tabled};

pub fn print_add(id: &str, outcome: &AddOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!(
        "{} indexed {} ({} fingerprints)",
        style("ok").green().bold(),
        style(id).bold(),
        outcome.fingerprint_count
    );
    Ok(())
}

pub fn print_recognition(result: &Recognition, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if result.matched {
        println!(
            "{} {}",
            style("match").green().bold(),
            style(result.song.as_deref().unwrap_or("?")).bold()
        );
        if let Some(position) = &result.position_in_song {
            println!("  position    {position}");
        }
        if let Some(confidence) = result.confidence {
            println!("  confidence  {confidence}");
        }
        println!("  raw score   {}", result.raw_score);
    } else {
        println!(
            "{} {} (raw score {})",
            style("no match").red().bold(),
            result.message.as_deref().unwrap_or("no match"),
            result.raw_score
        );
    }
    Ok(())
}

#[derive(Tabled)]
struct RecordingRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "fingerprints")]
    fingerprints: u64,
    #[tabled(rename = "duration")]
    duration: String,
}

pub fn print_catalog(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog)?);
        return Ok(());
    }

    if catalog.recordings.is_empty() {
        println!("index is empty");
        return Ok(());
    }

    let rows: Vec<RecordingRow> = catalog
        .recordings
        .iter()
        .map(|recording| RecordingRow {
            id: recording.id.clone(),
            fingerprints: recording.fingerprint_count,
            duration: format_position(recording.duration_seconds),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
    println!(
        "{} recordings, {} distinct hashes",
        catalog.total_recordings, catalog.total_hashes
    );
    Ok(())
}

pub fn print_stats(stats: &IndexStats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("hashes      {}", stats.hash_count);
    println!("recordings  {}", stats.recording_count);
    Ok(())
}

pub fn print_inspection(
    file: &Path,
    duration_seconds: f64,
    snr_db: f32,
    peaks: &PeakStats,
    fingerprints: usize,
    json: bool,
) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "file": file.display().to_string(),
            "duration_seconds": duration_seconds,
            "snr_db": snr_db,
            "peaks": peaks,
            "fingerprints": fingerprints,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", style(file.display()).bold());
    println!("  duration      {}", format_position(duration_seconds));
    println!("  snr estimate  {snr_db:.1} dB");
    println!(
        "  peaks         {} (amplitude {:.1} to {:.1} dB, mean {:.1})",
        peaks.total_peaks, peaks.min_amplitude, peaks.max_amplitude, peaks.mean_amplitude
    );
    println!("  fingerprints  {fingerprints}");
    Ok(())
}
