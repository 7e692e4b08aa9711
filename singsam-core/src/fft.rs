//! # Fast Fourier Transform (FFT) Module
//!
//! Spectral primitives for the frame-by-frame peak estimator: a reusable
//! forward transform, magnitude extraction, the DFT bin-to-frequency mapping
//! and peak picking.
//!
//! ## Features
//! - Forward FFT using RustFFT, planned once per frame size
//! - Optional Hann windowing and DC offset removal
//! - Standard DFT frequency convention for bin frequencies

use std::fmt;
use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};

use crate::config::WindowFunction;

/// Subtracts the frame mean so a recording offset does not dominate bin 0.
///
/// Offsets below 1e-6 are left alone.
fn remove_dc_offset(signal: &mut [f32]) {
    let len = signal.len();
    if len == 0 { return; }
    let avg = signal.iter().sum::<f32>() / len as f32;
    if avg.abs() > 1e-6 {
        for sample in signal.iter_mut() {
            *sample -= avg;
        }
    }
}

/// Tapers a vocal frame with a symmetric Hann window, in place.
///
/// Frames shorter than two samples are left untouched.
fn apply_hann_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n < 2 { return; }
    let n_minus_1 = (n - 1) as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let multiplier = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos());
        *sample *= multiplier;
    }
}

/// A forward FFT of fixed size, planned once and reused for every frame.
#[derive(Clone)]
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    size: usize,
    window: WindowFunction,
    remove_dc: bool,
}

impl fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("size", &self.size)
            .field("window", &self.window)
            .field("remove_dc", &self.remove_dc)
            .finish()
    }
}

impl SpectrumAnalyzer {
    /// Plans a forward transform of `size` points.
    pub fn new(size: usize, window: WindowFunction, remove_dc: bool) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size, window, remove_dc }
    }

    /// Performs a forward FFT on a frame and returns the complex spectrum.
    ///
    /// The frame is optionally DC-corrected and windowed first, according to
    /// how the analyzer was built.
    ///
    /// # Panics
    /// * If the frame length is not equal to the analyzer size
    pub fn process(&self, frame: &[f32]) -> Vec<Complex<f32>> {
        if frame.len() != self.size {
            panic!(
                "Input frame size ({}) must be equal to the FFT size ({})",
                frame.len(),
                self.size
            );
        }

        let mut processed_signal = frame.to_vec();
        if self.remove_dc {
            remove_dc_offset(&mut processed_signal);
        }
        if self.window == WindowFunction::Hann {
            apply_hann_window(&mut processed_signal);
        }

        let mut buffer: Vec<Complex<f32>> = processed_signal
            .into_iter()
            .map(|sample| Complex { re: sample, im: 0.0 })
            .collect();

        self.fft.process(&mut buffer);
        buffer
    }
}

/// Calculates the magnitude of every coefficient of a complex spectrum.
///
/// All N values are returned; callers restrict the range they search.
pub fn spectrum_to_magnitudes(spectrum: &[Complex<f32>]) -> Vec<f32> {
    spectrum
        .iter()
        .map(|c| c.norm()) // .norm() is sqrt(re^2 + im^2)
        .collect()
}

/// Frequency in Hz of each bin of an `n`-point transform at `sample_rate`.
///
/// Bins `0 .. ceil(n/2)` hold the non-negative frequencies `k * R / n`; the
/// remaining bins hold the negative mirror `(k - n) * R / n`. Computed in
/// `f64` so bins near a semitone boundary quantize consistently.
pub fn frequency_bins(n: usize, sample_rate: u32) -> Vec<f64> {
    let spacing = f64::from(sample_rate) / n as f64;
    let positive = n.div_ceil(2);
    (0..n)
        .map(|k| {
            if k < positive {
                k as f64 * spacing
            } else {
                -((n - k) as f64) * spacing
            }
        })
        .collect()
}

/// Index of the largest value, or `None` for an empty slice.
///
/// Ties resolve to the first index, so an all-equal spectrum picks bin 0.
pub fn peak_bin(magnitudes: &[f32]) -> Option<usize> {
    let mut iter = magnitudes.iter().copied().enumerate();
    let (mut best_index, mut best_value) = iter.next()?;
    for (index, value) in iter {
        if value > best_value {
            best_index = index;
            best_value = value;
        }
    }
    Some(best_index)
}

/// Root-mean-square amplitude of a frame.
pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|&s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}
