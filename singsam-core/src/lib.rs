// singsam-core/src/lib.rs

//! The core logic for the vocal pitch-to-MIDI extractor.
//! This crate is responsible for audio decoding, frame-wise spectral
//! pitch estimation and note quantization. It is completely headless
//! and does no console output.
//!
//! The pipeline is linear: samples are cut into fixed-size frames
//! ([`pitch::extract_pitch`]), each frame's peak frequency is mapped to a
//! MIDI note ([`tuning::frequency_to_midi`]), and the result is collected into
//! a [`NoteTrack`] by [`analyze`].

pub mod audio;
pub mod config;
pub mod fft;
pub mod pitch;
pub mod track;
pub mod tuning;

pub use audio::{DecodedAudio, decode_wav};
pub use config::{AnalysisConfig, DEFAULT_CHUNK_SIZE, WindowFunction};
pub use pitch::{PitchEstimate, PitchTrack, extract_pitch};
pub use track::{NoteEvent, NoteTrack, analyze, load_track, render_text, save_track};
pub use tuning::{frequency_to_midi, pitch_to_midi};
