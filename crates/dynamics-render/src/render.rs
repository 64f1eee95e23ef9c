//! Offline block loop
//!
//! Feeds a whole file through an effect in fixed-size blocks, the way an
//! audio callback would, and collects the output.

use anyhow::{ensure, Result};

use dynamics_core::effect::{CompressorEffect, Effect};
use dynamics_core::AudioBuffer;

/// How to drive the effect
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Frames per process call
    pub block_size: usize,
    /// Flush the look-ahead and drop the leading delay so output lines up
    /// with input
    pub compensate_latency: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            block_size: 512,
            compensate_latency: false,
        }
    }
}

/// What happened during a render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub frames: usize,
    pub channels: usize,
    pub latency_frames: usize,
    pub blocks: usize,
    /// Meter reading after the last block
    pub final_meter_db: f32,
    /// Deepest meter reading seen after any block
    pub min_meter_db: f32,
}

/// Run `input` through a prepared effect
///
/// The output has as many frames as the input. Without latency compensation
/// it is the raw effect output, shifted by the look-ahead.
pub fn render(
    effect: &mut CompressorEffect,
    input: &AudioBuffer,
    options: &RenderOptions,
) -> Result<(AudioBuffer, RenderSummary)> {
    ensure!(options.block_size > 0, "Block size must be at least 1 frame");

    let channels = input.channels();
    let frames = input.frames();
    let latency = if options.compensate_latency {
        effect.latency_samples() as usize
    } else {
        0
    };

    // Extra zero frames push the tail out of the delay line
    let total_frames = frames + latency;
    let mut processed = AudioBuffer::silence(channels, total_frames);
    let mut block = AudioBuffer::silence(channels, options.block_size);

    let mut blocks = 0;
    let mut min_meter_db = 0.0_f32;
    let mut start = 0;
    while start < total_frames {
        let len = options.block_size.min(total_frames - start);
        if len != block.frames() {
            block = AudioBuffer::silence(channels, len);
        }

        // Copy in whatever input is left, zero-pad past the end
        let available = frames.saturating_sub(start).min(len);
        for ch in 0..channels {
            let dst = block.channel_mut(ch);
            if available > 0 {
                dst[..available].copy_from_slice(&input.channel(ch)[start..start + available]);
            }
            dst[available..].fill(0.0);
        }

        effect.process(&mut block);

        for ch in 0..channels {
            processed.channel_mut(ch)[start..start + len].copy_from_slice(block.channel(ch));
        }

        min_meter_db = min_meter_db.min(effect.metering_db());
        blocks += 1;
        start += len;
    }

    let output = if latency == 0 {
        processed
    } else {
        let mut trimmed = AudioBuffer::silence(channels, frames);
        for ch in 0..channels {
            trimmed
                .channel_mut(ch)
                .copy_from_slice(&processed.channel(ch)[latency..]);
        }
        trimmed
    };

    let summary = RenderSummary {
        frames,
        channels,
        latency_frames: effect.latency_samples() as usize,
        blocks,
        final_meter_db: effect.metering_db(),
        min_meter_db,
    };

    Ok((output, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamics_core::config::CompressorConfig;
    use dynamics_core::effect::CompressorParam;

    fn prepared(channels: usize) -> CompressorEffect {
        let mut effect = CompressorEffect::from_config(&CompressorConfig::default());
        effect.prepare(48000.0, channels).unwrap();
        effect
    }

    fn ramp(channels: usize, frames: usize) -> AudioBuffer {
        let mut buffer = AudioBuffer::silence(channels, frames);
        for ch in 0..channels {
            for (i, sample) in buffer.channel_mut(ch).iter_mut().enumerate() {
                *sample = ((i % 100) as f32 / 100.0 - 0.5) * (ch + 1) as f32 * 0.1;
            }
        }
        buffer
    }

    #[test]
    fn test_dry_render_with_compensation_is_identity() {
        let mut effect = prepared(2);
        effect.set_param(CompressorParam::Mix.index(), 0.0);

        let input = ramp(2, 1000);
        let options = RenderOptions {
            block_size: 128,
            compensate_latency: true,
        };
        let (output, summary) = render(&mut effect, &input, &options).unwrap();

        assert_eq!(output, input);
        assert_eq!(summary.frames, 1000);
        assert_eq!(summary.latency_frames, 288);
        // 1288 frames in blocks of 128
        assert_eq!(summary.blocks, 11);
    }

    #[test]
    fn test_uncompensated_output_is_shifted() {
        let mut effect = prepared(1);
        effect.set_param(CompressorParam::Mix.index(), 0.0);

        let input = ramp(1, 600);
        let (output, _) = render(&mut effect, &input, &RenderOptions::default()).unwrap();

        assert_eq!(output.frames(), 600);
        assert!(output.channel(0)[..288].iter().all(|&s| s == 0.0));
        assert_eq!(&output.channel(0)[288..], &input.channel(0)[..312]);
    }

    #[test]
    fn test_loud_render_reports_gain_reduction() {
        let mut effect = prepared(2);
        let mut input = AudioBuffer::silence(2, 48000);
        for ch in 0..2 {
            for (i, sample) in input.channel_mut(ch).iter_mut().enumerate() {
                *sample = 0.9 * (i as f32 * 0.05).sin();
            }
        }

        let (output, summary) = render(&mut effect, &input, &RenderOptions::default()).unwrap();
        assert!(summary.min_meter_db < -3.0);
        assert!(summary.final_meter_db <= 0.0);
        assert!(output.channel(0).iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_zero_block_size_is_rejected() {
        let mut effect = prepared(1);
        let options = RenderOptions {
            block_size: 0,
            compensate_latency: false,
        };
        assert!(render(&mut effect, &AudioBuffer::silence(1, 10), &options).is_err());
    }
}
