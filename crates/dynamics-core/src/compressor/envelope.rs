//! Adaptive attack/release gain envelope
//!
//! Once per division the follower compares its current gain with the gain the
//! detector asks for and picks a per-sample rate:
//!
//! - **Attack** (gain must fall): exponential approach whose speed scales with
//!   the largest gap seen since the attack began, so deep hits converge in
//!   roughly the attack time regardless of depth.
//! - **Release** (gain may rise): multiplicative growth whose speed comes from
//!   a quartic through four release zones; deeper compression releases faster.
//!
//! Gains are pre-warped with `asin` and the output is warped back with `sin`
//! to round off the corners of the exponential segments.

use std::f32::consts::FRAC_PI_2;

use super::math::{db_to_linear, fix_gremlins, linear_to_db};

/// Frames per envelope division (rate is recomputed at each division start)
pub const DIVISION_FRAMES: usize = 32;

/// Release zones as fractions of the release time, at x = 0, 1, 2, 3
pub const RELEASE_ZONES: [f32; 4] = [0.09, 0.16, 0.42, 0.98];

/// dB covered per release-curve period
const RELEASE_SPACING_DB: f32 = 5.0;

/// Marks "no attack in progress"
const UNINITIALIZED_DIFF_DB: f32 = -1.0;

/// Shortest attack time in seconds
pub const MIN_ATTACK_TIME: f32 = 0.001;

/// Smallest gap used when deriving the attack rate
const MIN_ATTACK_DIFF_DB: f32 = 0.5;

/// Fraction of the attack gap left after `attack_frames`
const ATTACK_RESIDUAL: f32 = 0.25;

/// Compression range mapped onto the release curve
const RELEASE_RANGE_DB: f32 = 12.0;

/// Quartic release-time curve `a + bx + cx² + dx³ + ex⁴` over x ∈ [0, 3]
///
/// The coefficients are a fixed 4-point fit through
/// `release_frames × RELEASE_ZONES` at evenly spaced x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseCurve {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
}

impl ReleaseCurve {
    /// Fit the curve for a release time expressed in frames
    #[allow(clippy::excessive_precision)]
    pub fn new(release_frames: f32) -> Self {
        let y1 = release_frames * RELEASE_ZONES[0];
        let y2 = release_frames * RELEASE_ZONES[1];
        let y3 = release_frames * RELEASE_ZONES[2];
        let y4 = release_frames * RELEASE_ZONES[3];

        Self {
            a: 0.9999999999999998 * y1 + 1.8432219684323923e-16 * y2
                - 1.9373394351676423e-16 * y3
                + 8.824516011816245e-18 * y4,
            b: -1.5788320352845888 * y1 + 2.3305837032074286 * y2 - 0.9141194204840429 * y3
                + 0.1623677525612032 * y4,
            c: 0.5334142869106424 * y1 - 1.272736789213631 * y2 + 0.9258856042207512 * y3
                - 0.18656310191776226 * y4,
            d: 0.08783463138207234 * y1 - 0.1694162967925622 * y2 + 0.08588057951595272 * y3
                - 0.00429891410546283 * y4,
            e: -0.042416883008123074 * y1 + 0.1115693827987602 * y2 - 0.09764676325265872 * y3
                + 0.028494263462021576 * y4,
        }
    }

    /// Release duration in frames for a (negative) compression gap in dB
    ///
    /// Gaps are clamped to [-12, 0] dB and mapped linearly onto x ∈ [0, 3].
    #[inline]
    pub fn frames_at(&self, diff_db: f32) -> f32 {
        let x = 0.25 * (diff_db.clamp(-RELEASE_RANGE_DB, 0.0) + RELEASE_RANGE_DB);
        let x2 = x * x;
        let x3 = x2 * x;
        let x4 = x2 * x2;
        self.a + self.b * x + self.c * x2 + self.d * x3 + self.e * x4
    }
}

/// Gain follower state carried across blocks
#[derive(Debug, Clone)]
pub struct GainEnvelope {
    /// Pre-warp gain in [0, 1]
    gain: f32,
    /// Largest attack gap since the current attack started
    max_attack_diff_db: f32,
    /// Per-sample rate for the current division
    rate: f32,
    /// Pre-warped target for the current division
    target: f32,
}

impl GainEnvelope {
    pub fn new() -> Self {
        Self {
            gain: 1.0,
            max_attack_diff_db: UNINITIALIZED_DIFF_DB,
            rate: 1.0,
            target: 1.0,
        }
    }

    /// Choose the rate for the next division from the detector's desired gain
    pub fn update_rate(&mut self, desired_gain: f32, attack_frames: f32, release: &ReleaseCurve) {
        let desired_gain = fix_gremlins(desired_gain, 1.0);

        // Pre-warp so the sin() on the output lands on desired_gain
        self.target = desired_gain.asin() / FRAC_PI_2;

        let releasing = self.target > self.gain;
        let diff_db = linear_to_db(self.gain / self.target);

        self.rate = if releasing {
            self.max_attack_diff_db = UNINITIALIZED_DIFF_DB;

            let diff_db = fix_gremlins(diff_db, -1.0);
            let frames = release.frames_at(diff_db);
            db_to_linear(RELEASE_SPACING_DB / frames)
        } else {
            let diff_db = fix_gremlins(diff_db, 1.0);
            if self.max_attack_diff_db == UNINITIALIZED_DIFF_DB || self.max_attack_diff_db < diff_db {
                self.max_attack_diff_db = diff_db;
            }

            let effective_db = self.max_attack_diff_db.max(MIN_ATTACK_DIFF_DB);
            1.0 - (ATTACK_RESIDUAL / effective_db).powf(1.0 / attack_frames)
        };
    }

    /// Advance one frame and return the post-warp output gain
    #[inline]
    pub fn step(&mut self) -> f32 {
        if self.rate < 1.0 {
            self.gain += (self.target - self.gain) * self.rate;
        } else {
            self.gain = (self.gain * self.rate).min(1.0);
        }

        (FRAC_PI_2 * self.gain).sin()
    }

    /// Pre-warp gain
    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Rate chosen for the current division
    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// True while the current division is releasing
    #[inline]
    pub fn is_releasing(&self) -> bool {
        self.rate >= 1.0
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GainEnvelope {
    fn default() -> Self {
        Self::new()
    }
}
