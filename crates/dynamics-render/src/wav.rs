//! WAV file I/O
//!
//! Integer PCM is normalized to [-1.0, 1.0] on read and scaled back (with
//! clamping) on write. 32-bit float files pass through unchanged.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use dynamics_core::AudioBuffer;

/// Decoded WAV file
#[derive(Debug, Clone)]
pub struct WavAudio {
    /// Format of the source file, reused when writing the result
    pub spec: WavSpec,
    pub buffer: AudioBuffer,
}

/// Read a WAV file into a planar buffer
pub fn read_wav(path: &Path) -> Result<WavAudio> {
    let mut reader =
        WavReader::open(path).with_context(|| format!("Failed to open WAV file: {:?}", path))?;
    let spec = reader.spec();

    if spec.channels == 0 {
        bail!("WAV file has no channels: {:?}", path);
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .with_context(|| format!("Failed to decode samples from {:?}", path))?,
        SampleFormat::Int => {
            let scale = 1.0 / full_scale(spec.bits_per_sample);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<f32>, _>>()
                .with_context(|| format!("Failed to decode samples from {:?}", path))?
        }
    };

    let channels = spec.channels as usize;
    if interleaved.len() % channels != 0 {
        bail!("WAV file ends mid-frame: {:?}", path);
    }

    log::debug!(
        "Read {:?}: {} Hz, {} channel(s), {} bit {:?}",
        path,
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    Ok(WavAudio {
        spec,
        buffer: AudioBuffer::from_interleaved(&interleaved, channels),
    })
}

/// Write a planar buffer as a WAV file in the given format
pub fn write_wav(path: &Path, buffer: &AudioBuffer, spec: WavSpec) -> Result<()> {
    if buffer.channels() != spec.channels as usize {
        bail!(
            "Buffer has {} channel(s) but the WAV format expects {}",
            buffer.channels(),
            spec.channels
        );
    }

    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("Failed to create WAV file: {:?}", path))?;

    match spec.sample_format {
        SampleFormat::Float => {
            for frame in 0..buffer.frames() {
                for ch in 0..buffer.channels() {
                    writer.write_sample(buffer.sample(ch, frame))?;
                }
            }
        }
        SampleFormat::Int => {
            // Symmetric range so +1.0 and -1.0 both fit
            let scale = full_scale(spec.bits_per_sample) - 1.0;
            for frame in 0..buffer.frames() {
                for ch in 0..buffer.channels() {
                    let value = (buffer.sample(ch, frame).clamp(-1.0, 1.0) * scale).round();
                    writer.write_sample(value as i32)?;
                }
            }
        }
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {:?}", path))?;
    Ok(())
}

/// 2^(bits - 1), the magnitude of the most negative integer sample
fn full_scale(bits_per_sample: u16) -> f32 {
    (1u64 << (bits_per_sample.saturating_sub(1))) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(channels: u16, bits: u16, format: SampleFormat) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 48000,
            bits_per_sample: bits,
            sample_format: format,
        }
    }

    #[test]
    fn test_float_file_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");

        let left = [0.0, 0.25, -0.5, 1.5];
        let right = [0.1, -0.1, 0.2, -1.5];
        let buffer = AudioBuffer::from_channels(&[&left[..], &right[..]]);
        write_wav(&path, &buffer, spec(2, 32, SampleFormat::Float)).unwrap();

        let read = read_wav(&path).unwrap();
        assert_eq!(read.spec.sample_format, SampleFormat::Float);
        assert_eq!(read.buffer, buffer);
    }

    #[test]
    fn test_pcm16_is_normalized_and_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pcm16.wav");

        let samples = [0.0, 0.5, -0.5, 2.0, -2.0];
        let buffer = AudioBuffer::from_channels(&[&samples[..]]);
        write_wav(&path, &buffer, spec(1, 16, SampleFormat::Int)).unwrap();

        let read = read_wav(&path).unwrap();
        assert_eq!(read.spec.bits_per_sample, 16);
        assert_eq!(read.buffer.frames(), 5);

        let expected = [0.0, 0.5, -0.5, 1.0, -1.0];
        for (frame, &want) in expected.iter().enumerate() {
            let got = read.buffer.sample(0, frame);
            assert!((got - want).abs() < 1.0 / 16384.0, "frame {}: {} vs {}", frame, got, want);
        }
    }

    #[test]
    fn test_pcm24_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pcm24.wav");

        let samples: Vec<f32> = (0..64).map(|i| (i as f32 / 64.0 * 6.28).sin() * 0.8).collect();
        let buffer = AudioBuffer::from_channels(&[&samples[..]]);
        write_wav(&path, &buffer, spec(1, 24, SampleFormat::Int)).unwrap();

        let read = read_wav(&path).unwrap();
        for frame in 0..64 {
            assert!((read.buffer.sample(0, frame) - samples[frame]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_channel_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mismatch.wav");
        let buffer = AudioBuffer::silence(1, 8);
        assert!(write_wav(&path, &buffer, spec(2, 16, SampleFormat::Int)).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = read_wav(Path::new("/nonexistent/input.wav")).unwrap_err();
        assert!(format!("{:#}", err).contains("input.wav"));
    }
}
