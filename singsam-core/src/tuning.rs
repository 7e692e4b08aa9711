//! # Musical Tuning Module
//!
//! Quantizes frequencies onto the equal-tempered MIDI scale (A4 = 440 Hz =
//! note 69, twelve notes per octave) and names the resulting notes.
//!
//! Note 0 doubles as the "no pitch" marker: every frequency that is not
//! strictly positive quantizes to 0.

use once_cell::sync::Lazy;

/// MIDI note number of the reference pitch A4.
pub const A4_MIDI: i32 = 69;

/// Reference frequency of A4 in Hz.
pub const A4_FREQUENCY: f64 = 440.0;

/// Note value used for frames without a pitch.
pub const NO_PITCH: i32 = 0;

/// Names for MIDI notes 0 (C-1) through 127 (G9).
///
/// Built once on first use, octave numbering puts middle C (60) at C4.
static NOTE_NAMES: Lazy<Vec<String>> = Lazy::new(|| {
    const PITCH_CLASSES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    (0..128)
        .map(|note: i32| format!("{}{}", PITCH_CLASSES[(note % 12) as usize], note / 12 - 1))
        .collect()
});

/// Converts a frequency to the nearest MIDI note number.
///
/// Computes `round(69 + 12 * log2(f / 440))`. Halfway cases round away
/// from zero. Frequencies that are zero, negative or NaN return
/// [`NO_PITCH`]. Very small positive frequencies give large negative notes.
pub fn frequency_to_midi(freq: f64) -> i32 {
    // NaN fails this comparison too.
    if !(freq > 0.0) {
        return NO_PITCH;
    }
    let semitones = 12.0 * (freq / A4_FREQUENCY).log2();
    (A4_MIDI as f64 + semitones).round() as i32
}

/// Quantizes a whole pitch track, preserving order and length.
pub fn pitch_to_midi(pitch_track: &[f64]) -> Vec<i32> {
    pitch_track.iter().map(|&freq| frequency_to_midi(freq)).collect()
}

/// Name of a MIDI note, e.g. `"A4"` for 69. `None` outside 0..=127.
pub fn note_name(note: i32) -> Option<&'static str> {
    usize::try_from(note)
        .ok()
        .and_then(|index| NOTE_NAMES.get(index))
        .map(String::as_str)
}
