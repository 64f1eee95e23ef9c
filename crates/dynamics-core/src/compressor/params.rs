//! Per-block compressor parameter snapshot

use serde::{Deserialize, Serialize};

use super::envelope::MIN_ATTACK_TIME;

/// Lowest threshold accepted, in dB
pub const MIN_THRESHOLD_DB: f32 = -100.0;

/// Shortest release time accepted, in seconds
pub const MIN_RELEASE_TIME: f32 = 0.001;

/// Compressor settings read once at the top of every block
///
/// Out-of-range values are tolerated here and clamped by
/// [`sanitized`](Self::sanitized) before the audio path sees them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorParams {
    /// Level where compression begins, in dB (negative)
    pub threshold_db: f32,
    /// Input dB change per output dB above the knee (>= 1)
    pub ratio: f32,
    /// Width of the soft knee above the threshold, in dB
    pub knee_db: f32,
    /// Attack time in seconds
    pub attack_time: f32,
    /// Release time in seconds
    pub release_time: f32,
    /// Gain applied after compression and makeup, in dB
    pub post_gain_db: f32,
    /// Wet/dry blend (0 = dry, 1 = fully compressed)
    pub mix: f32,
}

impl CompressorParams {
    pub fn new() -> Self {
        Self {
            threshold_db: -24.0,
            ratio: 12.0,
            knee_db: 30.0,
            attack_time: 0.003,
            release_time: 0.25,
            post_gain_db: 0.0,
            mix: 1.0,
        }
    }

    /// Copy with every field clamped into its usable range
    ///
    /// Non-finite values fall back to the defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::new();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        Self {
            threshold_db: finite_or(self.threshold_db, defaults.threshold_db).clamp(MIN_THRESHOLD_DB, 0.0),
            ratio: finite_or(self.ratio, defaults.ratio).max(1.0),
            knee_db: finite_or(self.knee_db, defaults.knee_db).max(0.0),
            attack_time: finite_or(self.attack_time, defaults.attack_time).max(MIN_ATTACK_TIME),
            release_time: finite_or(self.release_time, defaults.release_time).max(MIN_RELEASE_TIME),
            post_gain_db: finite_or(self.post_gain_db, defaults.post_gain_db),
            mix: finite_or(self.mix, defaults.mix).clamp(0.0, 1.0),
        }
    }
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self::new()
    }
}
