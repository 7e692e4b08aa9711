//! # SingSam - Vocal Pitch to MIDI
//!
//! Command-line driver for the singsam core. Decodes a mono (or downmixed)
//! vocal WAV, estimates the dominant pitch of every frame, quantizes it to a
//! MIDI note and prints the sounding frames as a `time\tnote` table.
//!
//! Diagnostics go through `log`; set `RUST_LOG=debug` to see them.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use singsam_core::{
    AnalysisConfig, DEFAULT_CHUNK_SIZE, NoteTrack, WindowFunction, analyze, decode_wav,
    load_track, render_text, save_track,
};

/// Input used when no path is given on the command line.
const DEFAULT_INPUT: &str = "your_audio_vocals.wav";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WindowArg {
    Rectangular,
    Hann,
}

impl From<WindowArg> for WindowFunction {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Rectangular => WindowFunction::Rectangular,
            WindowArg::Hann => WindowFunction::Hann,
        }
    }
}

/// Extract a MIDI note track from a vocal recording.
#[derive(Debug, Parser)]
#[command(name = "singsam", version, about)]
struct Cli {
    /// Vocal-only WAV file to analyse
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Samples per analysis frame
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Window applied to each frame before the FFT
    #[arg(long, value_enum, default_value_t = WindowArg::Rectangular)]
    window: WindowArg,

    /// Subtract each frame's mean before the FFT
    #[arg(long)]
    remove_dc: bool,

    /// Treat frames quieter than this RMS level as silent
    #[arg(long, value_name = "RMS")]
    silence_threshold: Option<f32>,

    /// Also write the note track as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Print a previously saved JSON track instead of analysing audio
    #[arg(long, value_name = "PATH", conflicts_with = "json")]
    replay: Option<PathBuf>,
}

impl Cli {
    fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            chunk_size: self.chunk_size,
            window: self.window.into(),
            remove_dc_offset: self.remove_dc,
            silence_threshold: self.silence_threshold,
        }
    }
}

fn extract_track(cli: &Cli) -> Result<NoteTrack> {
    log::info!("[MAIN] Extracting pitch from {}...", cli.input.display());
    let audio = decode_wav(&cli.input)?;
    log::info!(
        "[MAIN] Loaded {:.2}s of audio at {} Hz ({} channel(s) mixed to mono)",
        audio.duration_seconds(),
        audio.sample_rate,
        audio.channels
    );

    let track = analyze(&audio.samples, audio.sample_rate, &cli.analysis_config())
        .with_context(|| format!("failed to analyse {}", cli.input.display()))?;

    if let Some(path) = &cli.json {
        save_track(&track, path)?;
        log::info!("[MAIN] Note track saved to {}", path.display());
    }
    Ok(track)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let track = match &cli.replay {
        Some(path) => {
            log::info!("[MAIN] Replaying note track from {}", path.display());
            load_track(path)?
        }
        None => extract_track(&cli)?,
    };

    render_text(&track, io::stdout().lock()).context("failed to write note table")?;
    Ok(())
}
