//! Static compression curve with an exponential soft knee
//!
//! The curve has three regions:
//!
//! 1. **Linear** below the threshold: output equals input.
//! 2. **Knee** between `threshold` and `threshold + knee` dB: an exponential
//!    segment `T + (1 - e^(-k(x - T))) / k` whose slope is 1 at the threshold
//!    and which asymptotically approaches `T + 1/k`.
//! 3. **Ratio** above the knee top: a straight line of slope `1/ratio` in the
//!    dB domain, starting from wherever the knee left off.
//!
//! The knee sharpness `k` has no closed form; it is found by bisection so that
//! the knee's dB/dB slope at the knee top matches `1/ratio`.

use super::math::{db_to_linear, linear_to_db};

/// Sentinel for cached fields that have not been computed yet
const UNINITIALIZED: f32 = -1.0;

/// Bisection bounds and starting point for the knee sharpness search
const MIN_K: f32 = 0.1;
const MAX_K: f32 = 10000.0;
const INITIAL_K: f32 = 5.0;
const K_SEARCH_ITERATIONS: usize = 15;

/// Relative input step used for the finite-difference slope
const SLOPE_PROBE: f32 = 1.001;

/// Perceptual exponent applied to the full-scale makeup gain
const MAKEUP_EXPONENT: f32 = 0.6;

/// Cached static curve derived from threshold, knee and ratio
#[derive(Debug, Clone)]
pub struct StaticCurve {
    db_threshold: f32,
    db_knee: f32,
    ratio: f32,
    slope: f32,
    linear_threshold: f32,
    knee_threshold: f32,
    knee_threshold_db: f32,
    /// Output level in dB at the knee top (start of the ratio line)
    y_knee_threshold_db: f32,
    k: f32,
    makeup_gain: f32,
}

impl StaticCurve {
    /// Create a curve with every cached field uninitialized
    ///
    /// The first call to [`update`](Self::update) always recomputes.
    pub fn new() -> Self {
        Self {
            db_threshold: UNINITIALIZED,
            db_knee: UNINITIALIZED,
            ratio: UNINITIALIZED,
            slope: UNINITIALIZED,
            linear_threshold: UNINITIALIZED,
            knee_threshold: UNINITIALIZED,
            knee_threshold_db: UNINITIALIZED,
            y_knee_threshold_db: UNINITIALIZED,
            k: UNINITIALIZED,
            makeup_gain: 1.0,
        }
    }

    /// Refresh the curve for a (threshold, knee, ratio) triple and return `k`
    ///
    /// Does nothing unless the triple differs from the cached one.
    pub fn update(&mut self, db_threshold: f32, db_knee: f32, ratio: f32) -> f32 {
        if db_threshold != self.db_threshold || db_knee != self.db_knee || ratio != self.ratio {
            self.db_threshold = db_threshold;
            self.linear_threshold = db_to_linear(db_threshold);
            self.db_knee = db_knee;

            self.ratio = ratio;
            self.slope = 1.0 / ratio;

            let k = self.k_at_slope(self.slope);

            self.knee_threshold_db = db_threshold + db_knee;
            self.knee_threshold = db_to_linear(self.knee_threshold_db);
            self.y_knee_threshold_db = linear_to_db(self.knee_curve(self.knee_threshold, k));

            self.k = k;

            // Restore full-scale loudness, softened for perceptual balance
            let full_range_gain = self.saturate(1.0, k);
            self.makeup_gain = (1.0 / full_range_gain).powf(MAKEUP_EXPONENT);
        }

        self.k
    }

    /// Exponential knee segment, identity below the threshold
    #[inline]
    pub fn knee_curve(&self, x: f32, k: f32) -> f32 {
        if x < self.linear_threshold {
            return x;
        }

        self.linear_threshold + (1.0 - (-k * (x - self.linear_threshold)).exp()) / k
    }

    /// Full compression curve: knee below the knee top, constant ratio above
    #[inline]
    pub fn saturate(&self, x: f32, k: f32) -> f32 {
        if x < self.knee_threshold {
            self.knee_curve(x, k)
        } else {
            let x_db = linear_to_db(x);
            let y_db = self.y_knee_threshold_db + self.slope * (x_db - self.knee_threshold_db);
            db_to_linear(y_db)
        }
    }

    /// Approximate dB-in/dB-out slope of the knee at `x`
    ///
    /// This is the inverse of the effective ratio at that level; a ratio of 20
    /// shows up as a slope of 1/20.
    pub fn slope_at(&self, x: f32, k: f32) -> f32 {
        if x < self.linear_threshold {
            return 1.0;
        }

        let x2 = x * SLOPE_PROBE;

        let x_db = linear_to_db(x);
        let x2_db = linear_to_db(x2);

        let y_db = linear_to_db(self.knee_curve(x, k));
        let y2_db = linear_to_db(self.knee_curve(x2, k));

        (y2_db - y_db) / (x2_db - x_db)
    }

    /// Find the knee sharpness whose slope at the knee top equals `desired_slope`
    ///
    /// Geometric bisection: a larger `k` flattens the knee faster, so a slope
    /// below the target means `k` is too high.
    pub fn k_at_slope(&self, desired_slope: f32) -> f32 {
        let x = db_to_linear(self.db_threshold + self.db_knee);

        let mut min_k = MIN_K;
        let mut max_k = MAX_K;
        let mut k = INITIAL_K;

        for _ in 0..K_SEARCH_ITERATIONS {
            let slope = self.slope_at(x, k);

            if slope < desired_slope {
                max_k = k;
            } else {
                min_k = k;
            }

            k = (min_k * max_k).sqrt();
        }

        k
    }

    /// Current knee sharpness
    #[inline]
    pub fn k(&self) -> f32 {
        self.k
    }

    /// Linear threshold amplitude
    #[inline]
    pub fn linear_threshold(&self) -> f32 {
        self.linear_threshold
    }

    /// Linear amplitude at the knee top
    #[inline]
    pub fn knee_threshold(&self) -> f32 {
        self.knee_threshold
    }

    /// Knee top in dB (`threshold + knee`)
    #[inline]
    pub fn knee_threshold_db(&self) -> f32 {
        self.knee_threshold_db
    }

    /// Slope of the ratio segment (`1 / ratio`)
    #[inline]
    pub fn slope(&self) -> f32 {
        self.slope
    }

    /// Full-scale makeup gain (linear)
    #[inline]
    pub fn makeup_gain(&self) -> f32 {
        self.makeup_gain
    }
}

impl Default for StaticCurve {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_curve(db_threshold: f32, db_knee: f32, ratio: f32) -> (StaticCurve, f32) {
        let mut curve = StaticCurve::new();
        let k = curve.update(db_threshold, db_knee, ratio);
        (curve, k)
    }

    #[test]
    fn test_identity_below_threshold() {
        for &(threshold, knee, ratio) in &[(-24.0, 30.0, 12.0), (-12.0, 6.0, 4.0), (-40.0, 0.0, 20.0)] {
            let (curve, k) = build_curve(threshold, knee, ratio);
            let linear_threshold = curve.linear_threshold();
            for i in 0..100 {
                let x = linear_threshold * i as f32 / 100.0;
                assert_eq!(curve.saturate(x, k), x, "x = {} not passed through", x);
            }
        }
    }

    #[test]
    fn test_knee_continuous_with_unity_slope() {
        let (curve, k) = build_curve(-24.0, 30.0, 12.0);
        let t = curve.linear_threshold();

        // Continuous at the threshold
        assert!((curve.knee_curve(t, k) - t).abs() < 1e-6);

        // Derivative just above the threshold matches the identity line
        let h = t * 1e-3;
        let derivative = (curve.knee_curve(t + h, k) - curve.knee_curve(t, k)) / h;
        assert!(
            (derivative - 1.0).abs() < 0.01,
            "derivative at threshold = {}",
            derivative
        );
    }

    #[test]
    fn test_k_matches_ratio_slope() {
        let (curve, k) = build_curve(-24.0, 30.0, 4.0);
        let slope = curve.slope_at(curve.knee_threshold(), k);
        assert!(
            (slope - 0.25).abs() < 0.0025,
            "slope at knee top = {} (k = {})",
            slope,
            k
        );
    }

    #[test]
    fn test_ratio_segment_slope() {
        let (curve, k) = build_curve(-24.0, 30.0, 4.0);
        // Above the knee top, 4 dB in gives 1 dB out
        let x = curve.knee_threshold() * 1.5;
        let y1 = linear_to_db(curve.saturate(x, k));
        let y2 = linear_to_db(curve.saturate(x * db_to_linear(4.0), k));
        assert!((y2 - y1 - 1.0).abs() < 1e-3, "dB out delta = {}", y2 - y1);
    }

    #[test]
    fn test_unity_ratio_is_transparent() {
        // Zero knee, ratio 1: the curve is the identity everywhere
        let (curve, k) = build_curve(-24.0, 0.0, 1.0);
        for &x in &[0.01, 0.1, 0.5, 1.0, 2.0, 4.0] {
            let y = curve.saturate(x, k);
            assert!((y - x).abs() / x < 1e-3, "saturate({}) = {}", x, y);
        }
        assert!((curve.makeup_gain() - 1.0).abs() < 1e-3);

        // With the default wide knee the curve bends only slightly
        let (curve, k) = build_curve(-24.0, 30.0, 1.0);
        for &x in &[0.01, 0.1, 0.5, 1.0] {
            let y = curve.saturate(x, k);
            assert!((y - x).abs() / x < 0.05, "saturate({}) = {}", x, y);
        }
        assert!((curve.makeup_gain() - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_compression_reduces_full_scale() {
        let (curve, k) = build_curve(-24.0, 30.0, 12.0);
        let full_scale = curve.saturate(1.0, k);
        assert!(full_scale < 1.0);
        assert!(curve.makeup_gain() > 1.0);
        assert!((curve.makeup_gain() - (1.0 / full_scale).powf(0.6)).abs() < 1e-5);
    }

    #[test]
    fn test_update_caches_unchanged_triple() {
        let mut curve = StaticCurve::new();
        let k1 = curve.update(-24.0, 30.0, 12.0);
        let makeup = curve.makeup_gain();

        // Same triple: cached values are reused
        let k2 = curve.update(-24.0, 30.0, 12.0);
        assert_eq!(k1, k2);
        assert_eq!(makeup, curve.makeup_gain());

        // Different ratio: recomputed
        let k3 = curve.update(-24.0, 30.0, 4.0);
        assert_ne!(k1, k3);
        assert_eq!(curve.slope(), 0.25);
    }
}
