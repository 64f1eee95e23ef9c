//! Gain-reduction meter
//!
//! Tracks the applied output gain in dB. Drops are followed instantly, rises
//! are smoothed with a slow one-pole release so the reading is easy to see.

use super::math::{discrete_time_constant, linear_to_db};

/// Meter release time constant in seconds
pub const METER_RELEASE_TIME: f64 = 0.325;

/// Lowest gain the meter can show, as a linear ratio (-120 dB)
const METER_FLOOR: f32 = 1e-6;

/// Smoothed output-gain reading in dB (0 dB = no reduction)
#[derive(Debug, Clone)]
pub struct Meter {
    gain_db: f32,
    release_k: f32,
}

impl Meter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            gain_db: 0.0,
            release_k: discrete_time_constant(METER_RELEASE_TIME, sample_rate as f64) as f32,
        }
    }

    /// Observe one frame's post-warp output gain
    #[inline]
    pub fn update(&mut self, output_gain: f32) {
        let gain_db = linear_to_db(output_gain.max(METER_FLOOR));
        if gain_db < self.gain_db {
            self.gain_db = gain_db;
        } else {
            self.gain_db += (gain_db - self.gain_db) * self.release_k;
        }
    }

    /// Current reading in dB
    #[inline]
    pub fn db(&self) -> f32 {
        self.gain_db
    }

    pub fn reset(&mut self) {
        self.gain_db = 0.0;
    }
}
