//! Look-ahead dynamic-range compressor
//!
//! Signal path for every frame:
//!
//! ```text
//! input ──┬──────────────────────► pre-delay ──────► × total gain ──► output
//!         │                                              ▲
//!         └─► peak ─► static curve ─► detector ─► envelope ─┘
//!                                                    └─► meter
//! ```
//!
//! The detector sees the undelayed input while the audible signal is held back
//! by the pre-delay, so gain reduction lands before the transient does. The
//! envelope rate is chosen once per 32-frame division; everything else runs
//! per frame.
//!
//! `process` is real-time safe: no allocation, locking, logging or fallible
//! calls. All allocation happens in [`Compressor::initialize`].

mod curve;
mod detector;
mod envelope;
mod lookahead;
pub mod math;
mod metering;
mod params;

pub use curve::StaticCurve;
pub use detector::{EnvelopeDetector, DETECTOR_RELEASE_TIME};
pub use envelope::{GainEnvelope, ReleaseCurve, DIVISION_FRAMES, MIN_ATTACK_TIME, RELEASE_ZONES};
pub use lookahead::{LookAheadBuffer, DEFAULT_PRE_DELAY_FRAMES, MAX_PRE_DELAY_FRAMES};
pub use metering::{Meter, METER_RELEASE_TIME};
pub use params::{CompressorParams, MIN_RELEASE_TIME, MIN_THRESHOLD_DB};

use std::f32::consts::FRAC_PI_2;

use crate::error::{DynamicsError, DynamicsResult};
use crate::types::{AudioBuffer, DEFAULT_SAMPLE_RATE, MAX_CHANNELS};
use math::db_to_linear;

/// Pre-delay applied at initialization unless changed, in seconds
pub const DEFAULT_PRE_DELAY_TIME: f32 = 0.006;

// ═══════════════════════════════════════════════════════════════════════════════
// Lifecycle
// ═══════════════════════════════════════════════════════════════════════════════

/// Lifecycle state of a [`Compressor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressorState {
    /// Constructed; no sample rate or channel layout yet
    Uninitialized,
    /// Buffers sized, nothing processed since initialization
    Initialized,
    /// At least one block has been processed
    Processing,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Compressor
// ═══════════════════════════════════════════════════════════════════════════════

/// Stateful look-ahead compressor for one multi-channel stream
///
/// Owns every piece of state it touches. Control calls (`initialize`,
/// `reset`, `set_pre_delay_time`) belong to the control thread; `process`
/// belongs to the audio thread and is never called concurrently with them.
#[derive(Debug, Clone)]
pub struct Compressor {
    state: CompressorState,
    sample_rate: f32,
    channels: usize,
    pre_delay_time: f32,

    curve: StaticCurve,
    lookahead: LookAheadBuffer,
    detector: EnvelopeDetector,
    envelope: GainEnvelope,
    meter: Meter,

    /// Release curve and the release time it was fitted for
    release_curve: ReleaseCurve,
    release_time: f32,
}

impl Compressor {
    /// Create an uninitialized compressor
    ///
    /// Call [`initialize`](Self::initialize) before processing.
    pub fn new() -> Self {
        let sample_rate = DEFAULT_SAMPLE_RATE as f32;
        let release_time = CompressorParams::default().release_time;

        Self {
            state: CompressorState::Uninitialized,
            sample_rate,
            channels: 0,
            pre_delay_time: DEFAULT_PRE_DELAY_TIME,
            curve: StaticCurve::new(),
            lookahead: LookAheadBuffer::new(0),
            detector: EnvelopeDetector::new(sample_rate),
            envelope: GainEnvelope::new(),
            meter: Meter::new(sample_rate),
            release_curve: ReleaseCurve::new(release_time * sample_rate),
            release_time,
        }
    }

    /// Size buffers for a sample rate and channel count
    ///
    /// May be called again to reconfigure; all running state is discarded and
    /// the current pre-delay time is re-applied.
    pub fn initialize(&mut self, sample_rate: f32, channels: usize) -> DynamicsResult<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(DynamicsError::InvalidSampleRate(sample_rate));
        }
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(DynamicsError::InvalidChannelCount {
                count: channels,
                max: MAX_CHANNELS,
            });
        }

        self.sample_rate = sample_rate;
        self.channels = channels;

        self.lookahead = LookAheadBuffer::new(channels);
        self.detector = EnvelopeDetector::new(sample_rate);
        self.envelope = GainEnvelope::new();
        self.meter = Meter::new(sample_rate);
        self.release_curve = ReleaseCurve::new(self.release_time * sample_rate);

        self.state = CompressorState::Initialized;
        self.apply_pre_delay();

        log::info!(
            "Compressor initialized: {} Hz, {} channel(s), {} frames look-ahead",
            sample_rate,
            channels,
            self.lookahead.delay_frames()
        );

        Ok(())
    }

    /// Restore the quiescent baseline without changing configuration
    ///
    /// Clears the delay line, detector, envelope and meter. The lifecycle
    /// state is left as it is.
    pub fn reset(&mut self) {
        self.lookahead.reset();
        self.detector.reset();
        self.envelope.reset();
        self.meter.reset();
        log::debug!("Compressor reset");
    }

    /// Set the look-ahead time in seconds
    ///
    /// Clamped to the ring capacity. The delay line is only rebuilt (and its
    /// contents cleared) when the resulting frame count changes.
    pub fn set_pre_delay_time(&mut self, seconds: f32) {
        self.pre_delay_time = seconds.max(0.0);
        if self.state != CompressorState::Uninitialized {
            self.apply_pre_delay();
        }
    }

    fn apply_pre_delay(&mut self) {
        let requested = (self.pre_delay_time * self.sample_rate) as usize;
        if requested >= MAX_PRE_DELAY_FRAMES {
            log::debug!(
                "Pre-delay of {} frames clamped to {}",
                requested,
                MAX_PRE_DELAY_FRAMES - 1
            );
        }

        if self.lookahead.set_delay_frames(requested) {
            log::debug!("Pre-delay set to {} frames", self.lookahead.delay_frames());
        }
    }

    /// Compress one block in place
    ///
    /// Channels beyond the initialized count are left untouched. A trailing
    /// partial division is processed as a shorter division.
    pub fn process(&mut self, params: &CompressorParams, buffer: &mut AudioBuffer) {
        debug_assert!(
            self.state != CompressorState::Uninitialized,
            "Compressor::process called before initialize"
        );
        if self.state == CompressorState::Uninitialized {
            return;
        }
        self.state = CompressorState::Processing;

        let params = params.sanitized();
        let k = self.curve.update(params.threshold_db, params.knee_db, params.ratio);
        let master_gain = db_to_linear(params.post_gain_db) * self.curve.makeup_gain();

        if params.release_time != self.release_time {
            self.release_time = params.release_time;
            self.release_curve = ReleaseCurve::new(params.release_time * self.sample_rate);
        }
        let attack_frames = params.attack_time.max(MIN_ATTACK_TIME) * self.sample_rate;

        let dry = 1.0 - params.mix;
        let wet = params.mix;

        let channels = buffer.channels().min(self.channels);
        let frames = buffer.frames();

        let mut division_start = 0;
        while division_start < frames {
            let division_end = (division_start + DIVISION_FRAMES).min(frames);

            let desired_gain = self.detector.desired_gain();
            self.envelope
                .update_rate(desired_gain, attack_frames, &self.release_curve);

            for frame in division_start..division_end {
                // Detect on the undelayed input, loudest channel wins
                let mut peak = 0.0_f32;
                for ch in 0..channels {
                    let input = buffer.sample(ch, frame);
                    self.lookahead.write(ch, input);
                    peak = peak.max(input.abs());
                }

                self.detector.step(peak, &self.curve, k);
                let output_gain = self.envelope.step();
                self.meter.update(output_gain);

                let total_gain = dry + wet * master_gain * output_gain;
                for ch in 0..channels {
                    let delayed = self.lookahead.read_delayed(ch);
                    buffer.set_sample(ch, frame, delayed * total_gain);
                }

                self.lookahead.advance();
            }

            division_start = division_end;
        }
    }

    /// Run only the pre-delay, leaving gain state untouched
    ///
    /// Keeps the output time-aligned with processed blocks while bypassed.
    pub fn process_delay_only(&mut self, buffer: &mut AudioBuffer) {
        if self.state == CompressorState::Uninitialized {
            return;
        }

        let channels = buffer.channels().min(self.channels);
        for frame in 0..buffer.frames() {
            for ch in 0..channels {
                self.lookahead.write(ch, buffer.sample(ch, frame));
                let delayed = self.lookahead.read_delayed(ch);
                buffer.set_sample(ch, frame, delayed);
            }
            self.lookahead.advance();
        }
    }

    /// Smoothed gain-reduction reading in dB (0 dB = none)
    #[inline]
    pub fn metering_db(&self) -> f32 {
        self.meter.db()
    }

    /// Delay in frames between input and output
    pub fn latency_frames(&self) -> usize {
        match self.state {
            CompressorState::Uninitialized => 0,
            _ => self.lookahead.delay_frames(),
        }
    }

    /// Detector's smoothed attenuation ratio
    pub fn running_average(&self) -> f32 {
        self.detector.average()
    }

    /// Post-warp gain applied to the most recent frame, before makeup and mix
    pub fn applied_gain(&self) -> f32 {
        (FRAC_PI_2 * self.envelope.gain()).sin()
    }

    /// Cached static curve for the most recent parameters
    pub fn static_curve(&self) -> &StaticCurve {
        &self.curve
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pre_delay_time(&self) -> f32 {
        self.pre_delay_time
    }

    pub fn state(&self) -> CompressorState {
        self.state
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
