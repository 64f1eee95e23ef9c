//! Look-ahead pre-delay line
//!
//! The audible signal is held back by `delay_frames` while the detector looks
//! at the undelayed input, so gain reduction is already in place when a
//! transient reaches the output.
//!
//! All channels live in one contiguous arena (`channels × MAX_PRE_DELAY_FRAMES`)
//! allocated once at initialization. Read and write cursors are shared by all
//! channels and wrap with a bitmask, so no allocation or division happens
//! while processing.

/// Ring capacity per channel (power of two)
pub const MAX_PRE_DELAY_FRAMES: usize = 1024;

/// Bitmask for wrapping cursors
const MAX_PRE_DELAY_FRAMES_MASK: usize = MAX_PRE_DELAY_FRAMES - 1;

/// Delay used before any pre-delay time has been applied
pub const DEFAULT_PRE_DELAY_FRAMES: usize = 256;

/// Multi-channel circular pre-delay buffer
#[derive(Debug, Clone)]
pub struct LookAheadBuffer {
    /// `channels × MAX_PRE_DELAY_FRAMES` samples, one ring per channel
    arena: Vec<f32>,
    channels: usize,
    delay_frames: usize,
    read_index: usize,
    write_index: usize,
}

impl LookAheadBuffer {
    /// Allocate a zeroed buffer for `channels` channels
    pub fn new(channels: usize) -> Self {
        Self {
            arena: vec![0.0; channels * MAX_PRE_DELAY_FRAMES],
            channels,
            delay_frames: DEFAULT_PRE_DELAY_FRAMES,
            read_index: 0,
            write_index: DEFAULT_PRE_DELAY_FRAMES,
        }
    }

    /// Set the delay in frames, clamped to the ring capacity
    ///
    /// Returns `true` if the delay changed. A change zeroes the rings and
    /// places the write cursor `frames` ahead of the read cursor.
    pub fn set_delay_frames(&mut self, frames: usize) -> bool {
        let frames = frames.min(MAX_PRE_DELAY_FRAMES - 1);
        if frames == self.delay_frames {
            return false;
        }

        self.delay_frames = frames;
        self.reset();
        true
    }

    /// Zero the rings and rewind the cursors, keeping the current delay
    pub fn reset(&mut self) {
        self.arena.fill(0.0);
        self.read_index = 0;
        self.write_index = self.delay_frames;
    }

    /// Store an undelayed sample for `channel` at the write cursor
    #[inline]
    pub fn write(&mut self, channel: usize, sample: f32) {
        self.arena[channel * MAX_PRE_DELAY_FRAMES + self.write_index] = sample;
    }

    /// Fetch the delayed sample for `channel` at the read cursor
    #[inline]
    pub fn read_delayed(&self, channel: usize) -> f32 {
        self.arena[channel * MAX_PRE_DELAY_FRAMES + self.read_index]
    }

    /// Advance both cursors by one frame
    #[inline]
    pub fn advance(&mut self) {
        self.read_index = (self.read_index + 1) & MAX_PRE_DELAY_FRAMES_MASK;
        self.write_index = (self.write_index + 1) & MAX_PRE_DELAY_FRAMES_MASK;
    }

    /// Current delay in frames
    #[inline]
    pub fn delay_frames(&self) -> usize {
        self.delay_frames
    }

    /// Number of channels the arena was sized for
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames per channel ring
    #[inline]
    pub fn capacity(&self) -> usize {
        MAX_PRE_DELAY_FRAMES
    }
}
