//! # Analysis Configuration
//!
//! The small, fixed set of parameters that drive one analysis run. The
//! defaults reproduce the plain spectral-peak behavior: 2048-sample frames,
//! no windowing, no DC removal and no silence gate.

use anyhow::{Result, ensure};

/// Default number of samples per analysis frame.
///
/// At 44.1 kHz this is roughly 46 ms per frame and a bin width of ~21.5 Hz.
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// Window applied to each frame before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowFunction {
    /// No tapering; the frame is transformed as-is.
    #[default]
    Rectangular,
    /// Hann window, trades peak sharpness for less spectral leakage.
    Hann,
}

/// Parameters for a single analysis run.
///
/// Chunk size and the sample rate supplied next to the samples stay fixed
/// for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Frame length in samples (default: 2048)
    pub chunk_size: usize,

    /// Window applied before the FFT (default: Rectangular)
    pub window: WindowFunction,

    /// Subtract the frame mean before the FFT (default: false)
    pub remove_dc_offset: bool,

    /// RMS level below which a frame is treated as silent (default: None).
    /// Silent frames report frequency 0 and are marked unvoiced.
    pub silence_threshold: Option<f32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            window: WindowFunction::Rectangular,
            remove_dc_offset: false,
            silence_threshold: None,
        }
    }
}

impl AnalysisConfig {
    /// Checks that the configuration describes a runnable analysis.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.chunk_size > 0, "chunk size must be greater than zero");
        if let Some(threshold) = self.silence_threshold {
            ensure!(
                threshold.is_finite() && threshold >= 0.0,
                "silence threshold must be a finite, non-negative RMS level (got {})",
                threshold
            );
        }
        Ok(())
    }
}
