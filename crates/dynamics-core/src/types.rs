//! Common types for the dynamics crates
//!
//! This module contains the fundamental audio types used by the compressor
//! and its host adapter: the sample type and a planar multi-channel buffer.

use std::ops::{Index, IndexMut};

/// Default sample rate (48kHz - standard professional audio rate)
/// This is the default; hosts pass their actual rate to `initialize`.
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Maximum number of channels a single compressor instance will accept
pub const MAX_CHANNELS: usize = 32;

/// Audio sample type (32-bit float for processing)
pub type Sample = f32;

/// A planar block of multi-channel audio
///
/// Channel `c` occupies `samples[c * frames..(c + 1) * frames]`, so each
/// channel is a contiguous slice. The compressor processes these in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<Sample>,
    channels: usize,
    frames: usize,
}

impl AudioBuffer {
    /// Create a buffer filled with silence
    pub fn silence(channels: usize, frames: usize) -> Self {
        Self {
            samples: vec![0.0; channels * frames],
            channels,
            frames,
        }
    }

    /// Create a buffer from interleaved samples [c0, c1, .., c0, c1, ..]
    pub fn from_interleaved(interleaved: &[Sample], channels: usize) -> Self {
        assert!(channels > 0, "Channel count must be positive");
        assert!(
            interleaved.len() % channels == 0,
            "Interleaved buffer length must be a multiple of the channel count"
        );
        let frames = interleaved.len() / channels;
        let mut buffer = Self::silence(channels, frames);
        for (frame, chunk) in interleaved.chunks_exact(channels).enumerate() {
            for (ch, &sample) in chunk.iter().enumerate() {
                buffer.samples[ch * frames + frame] = sample;
            }
        }
        buffer
    }

    /// Create a buffer from separate channel slices (all the same length)
    pub fn from_channels(channels: &[&[Sample]]) -> Self {
        let frames = channels.first().map(|c| c.len()).unwrap_or(0);
        assert!(
            channels.iter().all(|c| c.len() == frames),
            "Channel lengths must match"
        );
        let mut samples = Vec::with_capacity(channels.len() * frames);
        for channel in channels {
            samples.extend_from_slice(channel);
        }
        Self {
            samples,
            channels: channels.len(),
            frames,
        }
    }

    /// Number of channels
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Check if the buffer holds no frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Get one channel as a slice
    #[inline]
    pub fn channel(&self, ch: usize) -> &[Sample] {
        &self.samples[ch * self.frames..(ch + 1) * self.frames]
    }

    /// Get one channel as a mutable slice
    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [Sample] {
        &mut self.samples[ch * self.frames..(ch + 1) * self.frames]
    }

    /// Read a single sample
    #[inline]
    pub fn sample(&self, ch: usize, frame: usize) -> Sample {
        self.samples[ch * self.frames + frame]
    }

    /// Write a single sample
    #[inline]
    pub fn set_sample(&mut self, ch: usize, frame: usize, value: Sample) {
        self.samples[ch * self.frames + frame] = value;
    }

    /// Fill the buffer with silence
    pub fn fill_silence(&mut self) {
        self.samples.fill(0.0);
    }

    /// Copy samples to an interleaved output buffer
    pub fn to_interleaved(&self, output: &mut [Sample]) {
        assert!(output.len() >= self.samples.len());
        for frame in 0..self.frames {
            for ch in 0..self.channels {
                output[frame * self.channels + ch] = self.sample(ch, frame);
            }
        }
    }

    /// Scale all samples by a factor
    pub fn scale(&mut self, factor: Sample) {
        for sample in &mut self.samples {
            *sample *= factor;
        }
    }

    /// Peak absolute amplitude across all channels at one frame
    #[inline]
    pub fn frame_peak(&self, frame: usize) -> Sample {
        (0..self.channels)
            .map(|ch| self.sample(ch, frame).abs())
            .fold(0.0, Sample::max)
    }

    /// Peak absolute amplitude in the whole buffer
    pub fn peak(&self) -> Sample {
        self.samples.iter().map(|s| s.abs()).fold(0.0, Sample::max)
    }
}

impl Index<usize> for AudioBuffer {
    type Output = [Sample];

    #[inline]
    fn index(&self, ch: usize) -> &Self::Output {
        self.channel(ch)
    }
}

impl IndexMut<usize> for AudioBuffer {
    #[inline]
    fn index_mut(&mut self, ch: usize) -> &mut Self::Output {
        self.channel_mut(ch)
    }
}
