//! Per-block parameter smoothing
//!
//! Host parameter changes arrive as steps. The compressor reads one parameter
//! snapshot per block, so smoothing is applied once per block with a one-pole
//! step scaled to the block length.

use crate::compressor::math::discrete_time_constant;

/// Default smoothing time constant in seconds
pub const DEFAULT_SMOOTHING_TIME: f32 = 0.02;

/// One-pole smoother advanced once per block
#[derive(Debug, Clone)]
pub struct ParamSmoother {
    current: f32,
    target: f32,
    time_constant: f32,
    /// Snap to the target on the next advance
    primed: bool,
}

impl ParamSmoother {
    /// Create a smoother with the given time constant in seconds
    ///
    /// Zero disables smoothing.
    pub fn new(time_constant: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            time_constant: time_constant.max(0.0),
            primed: false,
        }
    }

    /// Set the value to move towards
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Current smoothed value
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Move towards the target by one block and return the new value
    ///
    /// The first call after construction or [`reset`](Self::reset) jumps
    /// straight to the target.
    pub fn advance(&mut self, frames: usize, sample_rate: f32) -> f32 {
        if !self.primed || self.time_constant == 0.0 {
            self.current = self.target;
            self.primed = true;
            return self.current;
        }
        if frames == 0 {
            return self.current;
        }

        let block_rate = sample_rate as f64 / frames as f64;
        let coeff = discrete_time_constant(self.time_constant as f64, block_rate) as f32;
        self.current += (self.target - self.current) * coeff;
        self.current
    }

    /// True while the current value is still moving
    pub fn is_smoothing(&self) -> bool {
        (self.current - self.target).abs() > 1e-6
    }

    /// Forget the history; the next advance snaps to the target
    pub fn reset(&mut self) {
        self.primed = false;
    }
}

impl Default for ParamSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_TIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_advance_snaps() {
        let mut smoother = ParamSmoother::default();
        smoother.set_target(-24.0);
        assert_eq!(smoother.advance(512, 48000.0), -24.0);
        assert!(!smoother.is_smoothing());
    }

    #[test]
    fn test_reaches_63_percent_after_one_time_constant() {
        let mut smoother = ParamSmoother::new(0.02);
        smoother.set_target(0.0);
        smoother.advance(480, 48000.0);

        // 20 ms at 48 kHz is two 480-frame blocks
        smoother.set_target(1.0);
        smoother.advance(480, 48000.0);
        let value = smoother.advance(480, 48000.0);
        assert!((value - 0.632).abs() < 0.01, "value = {}", value);
        assert!(smoother.is_smoothing());
    }

    #[test]
    fn test_longer_blocks_move_further() {
        let mut short = ParamSmoother::new(0.02);
        let mut long = ParamSmoother::new(0.02);
        for smoother in [&mut short, &mut long] {
            smoother.advance(64, 48000.0);
            smoother.set_target(1.0);
        }

        assert!(long.advance(1024, 48000.0) > short.advance(64, 48000.0));
    }

    #[test]
    fn test_zero_time_is_immediate_and_reset_snaps() {
        let mut smoother = ParamSmoother::new(0.0);
        smoother.advance(64, 48000.0);
        smoother.set_target(5.0);
        assert_eq!(smoother.advance(64, 48000.0), 5.0);

        let mut smoother = ParamSmoother::new(1.0);
        smoother.advance(64, 48000.0);
        smoother.set_target(5.0);
        assert!(smoother.advance(64, 48000.0) < 5.0);
        smoother.reset();
        assert_eq!(smoother.advance(64, 48000.0), 5.0);
    }
}
