//! Shaped-power envelope detector
//!
//! Runs once per frame on the undelayed peak across channels. The peak goes
//! through the static curve; the ratio of shaped to raw level is the
//! instantaneous attenuation the curve asks for. The running average follows
//! downward moves immediately and recovers over a short fixed release.

use super::curve::StaticCurve;
use super::math::{db_to_linear, fix_gremlins, linear_to_db};

/// Detector release time constant in seconds
pub const DETECTOR_RELEASE_TIME: f32 = 0.0025;

/// Inputs at or below this level count as silence (attenuation 1)
const SILENCE_LEVEL: f32 = 0.0001;

/// Smallest attenuation in dB used to derive the release step
const MIN_RELEASE_DB: f32 = 2.0;

/// Running estimate of the attenuation requested by the static curve
#[derive(Debug, Clone)]
pub struct EnvelopeDetector {
    /// Smoothed attenuation ratio in [0, 1]
    average: f32,
    /// Detector release time expressed in frames
    release_frames: f32,
}

impl EnvelopeDetector {
    /// Create a detector at the quiescent baseline for a sample rate
    pub fn new(sample_rate: f32) -> Self {
        Self {
            average: 0.0,
            release_frames: DETECTOR_RELEASE_TIME * sample_rate,
        }
    }

    /// Feed one frame's peak magnitude and return its instantaneous attenuation
    #[inline]
    pub fn step(&mut self, peak: f32, curve: &StaticCurve, k: f32) -> f32 {
        let abs_input = peak.abs();

        // Linear up to the threshold, then knee, then ratio
        let shaped = curve.saturate(abs_input, k);
        let attenuation = if abs_input <= SILENCE_LEVEL {
            1.0
        } else {
            shaped / abs_input
        };

        // Bound the per-frame release step from below
        let attenuation_db = (-linear_to_db(attenuation)).max(MIN_RELEASE_DB);
        let db_per_frame = attenuation_db / self.release_frames;
        let release_rate = db_to_linear(db_per_frame) - 1.0;

        let rate = if attenuation > self.average {
            release_rate
        } else {
            1.0
        };

        let average = self.average + (attenuation - self.average) * rate;
        self.average = if average.is_finite() {
            average.clamp(0.0, 1.0)
        } else {
            1.0
        };

        attenuation
    }

    /// Smoothed attenuation ratio
    #[inline]
    pub fn average(&self) -> f32 {
        self.average
    }

    /// Smoothed attenuation with NaN/Inf replaced by unity
    #[inline]
    pub fn desired_gain(&mut self) -> f32 {
        self.average = fix_gremlins(self.average, 1.0);
        self.average
    }

    /// Return to the quiescent baseline
    pub fn reset(&mut self) {
        self.average = 0.0;
    }
}
