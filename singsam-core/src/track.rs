//! # Note Track Module
//!
//! Runs the estimator and quantizer over a recording and produces the
//! time-ordered note series handed to downstream sequencing. Also renders the
//! series as text and persists it as JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::pitch::{self, PitchEstimate};
use crate::tuning;

/// One analysed frame: when it starts, its peak frequency and the note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Frame start in seconds.
    pub time: f64,
    /// Peak frequency in Hz.
    pub frequency: f64,
    /// MIDI note number, 0 when there is no pitch.
    pub note: i32,
    /// Note name such as `"A4"`, for notes in the MIDI range 1..=127.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the frame carried a usable pitch.
    pub voiced: bool,
}

impl NoteEvent {
    fn from_estimate(estimate: PitchEstimate) -> Self {
        let note = tuning::frequency_to_midi(estimate.frequency);
        let name = if note > tuning::NO_PITCH {
            tuning::note_name(note).map(str::to_owned)
        } else {
            None
        };
        Self {
            time: estimate.time,
            frequency: estimate.frequency,
            note,
            name,
            voiced: estimate.voiced,
        }
    }
}

/// The full result of one run, one event per complete frame in time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTrack {
    pub sample_rate: u32,
    pub chunk_size: usize,
    pub events: Vec<NoteEvent>,
}

impl NoteTrack {
    /// Events that carry a note, i.e. the ones that get printed.
    pub fn sounding(&self) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter(|event| event.note > 0)
    }
}

/// Analyses a mono recording into a note track.
///
/// # Arguments
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz, must be non-zero
/// * `config` - Analysis parameters
///
/// # Returns
/// * `Ok(NoteTrack)` - One event per complete frame; empty for short input
/// * `Err(e)` - The configuration or sample rate is unusable
pub fn analyze(samples: &[f32], sample_rate: u32, config: &AnalysisConfig) -> Result<NoteTrack> {
    config.validate()?;
    ensure!(sample_rate > 0, "sample rate must be greater than zero");

    let events: Vec<NoteEvent> = pitch::extract_pitch(samples, sample_rate, config)
        .map(NoteEvent::from_estimate)
        .collect();

    log::debug!(
        "Analysed {} frames, {} with a note",
        events.len(),
        events.iter().filter(|e| e.note > 0).count()
    );

    Ok(NoteTrack {
        sample_rate,
        chunk_size: config.chunk_size,
        events,
    })
}

/// Writes the track as a tab-separated table.
///
/// A header line is followed by `"<time>s\t<note>"` for every event with a
/// note; events without one are left out.
pub fn render_text<W: Write>(track: &NoteTrack, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "Time (s)\tMIDI Note")?;
    for event in track.sounding() {
        writeln!(writer, "{:.2}s\t{}", event.time, event.note)?;
    }
    writer.flush()
}

/// Saves a note track to a JSON file.
///
/// # Arguments
/// * `track` - The track to save
/// * `path` - Destination file, created or truncated
pub fn save_track(track: &NoteTrack, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, track)
        .with_context(|| format!("failed to write note track to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// Loads a note track previously written by [`save_track`].
pub fn load_track(path: impl AsRef<Path>) -> Result<NoteTrack> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let track = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a valid note track", path.display()))?;
    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(time: f64, frequency: f64, note: i32) -> NoteEvent {
        NoteEvent {
            time,
            frequency,
            note,
            name: tuning::note_name(note).filter(|_| note > 0).map(str::to_owned),
            voiced: note > 0,
        }
    }

    fn rendered(track: &NoteTrack) -> String {
        let mut out = Vec::new();
        render_text(track, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn render_skips_events_without_a_note() {
        let track = NoteTrack {
            sample_rate: 44100,
            chunk_size: 2048,
            events: vec![
                event(0.0, 0.0, 0),
                event(0.046439, 441.43, 69),
                event(0.092879, 0.0, 0),
                event(1.5, 880.0, 81),
            ],
        };
        assert_eq!(rendered(&track), "Time (s)\tMIDI Note\n0.05s\t69\n1.50s\t81\n");
    }

    #[test]
    fn late_frames_render_with_double_precision_times() {
        // Frame 5608 starts at 11485184 / 44100 = 260.43501... s.
        let time = (5608 * 2048) as f64 / 44100.0;
        let track = NoteTrack {
            sample_rate: 44100,
            chunk_size: 2048,
            events: vec![event(time, 430.6640625, 69)],
        };
        assert_eq!(rendered(&track), "Time (s)\tMIDI Note\n260.44s\t69\n");
    }

    #[test]
    fn analyzed_events_carry_note_names() {
        let sample_rate = 8000;
        // Bin 55 of a 1024-point frame is 429.6875 Hz, which rounds to A4.
        let samples: Vec<f32> = (0..2048)
            .map(|i| (2.0 * std::f64::consts::PI * 55.0 * i as f64 / 1024.0).sin() as f32)
            .collect();
        let config = AnalysisConfig { chunk_size: 1024, ..Default::default() };
        let track = analyze(&samples, sample_rate, &config).unwrap();
        assert_eq!(track.events.len(), 2);
        for e in &track.events {
            assert_eq!(e.note, 69);
            assert_eq!(e.name.as_deref(), Some("A4"));
        }

        let silent = analyze(&[0.0; 1024], sample_rate, &config).unwrap();
        assert_eq!(silent.events[0].name, None);
    }

    #[test]
    fn negative_notes_are_not_rendered() {
        let track = NoteTrack {
            sample_rate: 8000,
            chunk_size: 256,
            events: vec![event(0.0, 0.001, -344)],
        };
        assert_eq!(rendered(&track), "Time (s)\tMIDI Note\n");
    }

    #[test]
    fn analyze_rejects_zero_sample_rate() {
        assert!(analyze(&[0.0; 4096], 0, &AnalysisConfig::default()).is_err());
    }

    #[test]
    fn analyze_keeps_one_event_per_frame() {
        let samples = vec![0.0; 2048 * 3 + 17];
        let track = analyze(&samples, 44100, &AnalysisConfig::default()).unwrap();
        assert_eq!(track.events.len(), 3);
        assert!(track.events.iter().all(|e| e.note == 0 && e.frequency == 0.0 && !e.voiced));
        assert_eq!(track.sounding().count(), 0);
    }

    #[test]
    fn saved_track_loads_back() {
        let path = std::env::temp_dir().join(format!("singsam-track-{}.json", std::process::id()));
        let track = NoteTrack {
            sample_rate: 44100,
            chunk_size: 2048,
            events: vec![event(0.0, 430.5, 69), event(0.046875, 0.0, 0)],
        };
        save_track(&track, &path).unwrap();
        let loaded = load_track(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, track);
    }

    #[test]
    fn loading_garbage_fails() {
        let path = std::env::temp_dir().join(format!("singsam-garbage-{}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();
        let result = load_track(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
