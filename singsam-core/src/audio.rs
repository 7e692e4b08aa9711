//! # Audio Input Module
//!
//! Loads a WAV recording into memory as a single mono `f32` sample sequence
//! using Hound. The whole file is decoded up front; analysis never streams.
//!
//! ## Sample handling
//! - Integer PCM is scaled to [-1.0, 1.0) by its bit depth
//! - Float PCM is passed through unchanged
//! - Multi-channel audio is averaged down to one channel

use std::path::Path;

use anyhow::{Context, Result, ensure};
use hound::{SampleFormat, WavReader};

/// A decoded recording, collapsed to mono.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Mono samples in file order.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source file before downmixing.
    pub channels: u16,
}

impl DecodedAudio {
    /// Length of the recording in seconds.
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decodes a WAV file into mono samples and its sample rate.
///
/// # Arguments
/// * `path` - Path to a RIFF/WAVE file
///
/// # Returns
/// * `Ok(DecodedAudio)` - Mono samples, sample rate and original channel count
/// * `Err(e)` - The file could not be opened or contains malformed sample data
pub fn decode_wav(path: impl AsRef<Path>) -> Result<DecodedAudio> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();

    log::debug!(
        "Decoding {}: {} Hz, {} channel(s), {} bit {:?}",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    ensure!(spec.channels > 0, "{} declares zero channels", path.display());
    ensure!(spec.sample_rate > 0, "{} declares a zero sample rate", path.display());

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("failed to read float samples from {}", path.display()))?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 * scale))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("failed to read integer samples from {}", path.display()))?
        }
    };

    let samples = downmix_to_mono(&interleaved, spec.channels);
    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Averages interleaved multi-channel samples into one channel.
///
/// An incomplete frame at the end of the buffer is dropped. Mono input is
/// returned as a copy.
pub fn downmix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let channels = usize::from(channels.max(1));
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn temp_wav(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("singsam-audio-{}-{}.wav", name, std::process::id()))
    }

    #[test]
    fn downmix_averages_channels() {
        let stereo = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0, 0.25];
        assert_eq!(downmix_to_mono(&stereo, 2), vec![0.5, 0.5, 0.0]);
        assert_eq!(downmix_to_mono(&[0.1, 0.2], 1), vec![0.1, 0.2]);
    }

    #[test]
    fn decodes_stereo_int_file_to_mono() {
        let path = temp_wav("stereo16");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..10 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let audio = decode_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.samples.len(), 10);
        for sample in &audio.samples {
            assert!((sample - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn decodes_float_file_unchanged() {
        let path = temp_wav("mono32f");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for sample in [0.5f32, -0.25, 0.125] {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let audio = decode_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(audio.samples, vec![0.5, -0.25, 0.125]);
        assert!((audio.duration_seconds() - 3.0 / 48000.0).abs() < 1e-9);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = decode_wav("/definitely/not/here.wav").unwrap_err();
        assert!(err.to_string().contains("failed to open WAV file"));
    }
}
