//! # Pitch Detection Module
//!
//! Frame-wise spectral-peak pitch estimation. The signal is cut into
//! non-overlapping frames of `chunk_size` samples; each complete frame is
//! transformed and the strongest non-negative frequency bin is reported as
//! that frame's pitch. A trailing partial frame is dropped.
//!
//! This is a dominant-frequency estimator, not a fundamental tracker: a voice
//! with a strong second harmonic reports the harmonic.

use std::iter::FusedIterator;
use std::slice::ChunksExact;

use crate::config::AnalysisConfig;
use crate::fft::{self, SpectrumAnalyzer};

/// Pitch estimate for one analysis frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Start of the frame in seconds.
    pub time: f64,
    /// Peak frequency in Hz, always >= 0.
    pub frequency: f64,
    /// False when the frame was gated as silent or its peak sits on DC.
    pub voiced: bool,
}

/// Lazy sequence of [`PitchEstimate`]s, one per complete frame.
///
/// A clone continues from the same position. Call [`extract_pitch`] again to
/// start over from the first frame.
#[derive(Debug, Clone)]
pub struct PitchTrack<'a> {
    frames: ChunksExact<'a, f32>,
    next_start: usize,
    sample_rate: u32,
    analyzer: SpectrumAnalyzer,
    bin_frequencies: Vec<f64>,
    silence_threshold: Option<f32>,
}

/// Builds the pitch estimator over `samples`.
///
/// The returned iterator yields `samples.len() / config.chunk_size` estimates
/// in time order. Inputs shorter than one frame, and a chunk size of zero,
/// yield nothing.
pub fn extract_pitch<'a>(
    samples: &'a [f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> PitchTrack<'a> {
    let n = config.chunk_size;
    log::debug!(
        "Extracting pitch: {} samples at {} Hz, {} frames of {}",
        samples.len(),
        sample_rate,
        samples.len().checked_div(n).unwrap_or(0),
        n
    );

    // A zero chunk size has no complete frames.
    let source = if n == 0 { &samples[..0] } else { samples };

    // Only the lower half of the spectrum is searched.
    let mut bin_frequencies = fft::frequency_bins(n, sample_rate);
    bin_frequencies.truncate(n / 2);

    PitchTrack {
        frames: source.chunks_exact(n.max(1)),
        next_start: 0,
        sample_rate,
        analyzer: SpectrumAnalyzer::new(n, config.window, config.remove_dc_offset),
        bin_frequencies,
        silence_threshold: config.silence_threshold,
    }
}

impl PitchTrack<'_> {
    fn estimate(&self, frame: &[f32], start: usize) -> PitchEstimate {
        let time = start as f64 / f64::from(self.sample_rate);

        if let Some(threshold) = self.silence_threshold {
            let level = fft::rms(frame);
            if level < threshold {
                log::trace!("Frame at {:.3}s gated as silent (rms {:.5})", time, level);
                return PitchEstimate { time, frequency: 0.0, voiced: false };
            }
        }

        let spectrum = self.analyzer.process(frame);
        let magnitudes = fft::spectrum_to_magnitudes(&spectrum);
        let half = &magnitudes[..self.bin_frequencies.len()];

        let frequency = fft::peak_bin(half)
            .map(|bin| self.bin_frequencies[bin].abs())
            .unwrap_or(0.0);

        log::trace!("Frame at {:.3}s peaks at {:.2} Hz", time, frequency);
        PitchEstimate { time, frequency, voiced: frequency > 0.0 }
    }
}

impl Iterator for PitchTrack<'_> {
    type Item = PitchEstimate;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.frames.next()?;
        let start = self.next_start;
        self.next_start += frame.len();
        Some(self.estimate(frame, start))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.frames.size_hint()
    }
}

impl ExactSizeIterator for PitchTrack<'_> {}

impl FusedIterator for PitchTrack<'_> {}
