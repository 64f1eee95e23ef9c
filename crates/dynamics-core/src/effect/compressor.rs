//! Compressor effect - look-ahead compressor behind the host parameter model

use crate::compressor::{Compressor, CompressorParams, CompressorState};
use crate::config::CompressorConfig;
use crate::effect::{Effect, EffectBase, EffectInfo, ParamInfo, ParamSmoother, ParamValue};
use crate::error::DynamicsResult;
use crate::types::AudioBuffer;

/// Host-visible compressor parameters, in `set_param` index order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressorParam {
    Threshold,
    Ratio,
    Knee,
    Attack,
    Release,
    Mix,
}

impl CompressorParam {
    pub const ALL: [CompressorParam; 6] = [
        CompressorParam::Threshold,
        CompressorParam::Ratio,
        CompressorParam::Knee,
        CompressorParam::Attack,
        CompressorParam::Release,
        CompressorParam::Mix,
    ];

    /// Index used with [`Effect::set_param`]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Look-ahead compressor as a host effect
///
/// Parameters:
/// - Threshold: -100 to 0 dB (default -24)
/// - Ratio: 1 to 20 (default 12)
/// - Knee: 0 to 40 dB (default 30)
/// - Attack: 0 to 1 s (default 0.003)
/// - Release: 0 to 1 s (default 0.25)
/// - Mix: 0 to 1 (default 1 = fully compressed)
///
/// Latency equals the pre-delay (6 ms by default) and stays the same while
/// bypassed.
pub struct CompressorEffect {
    base: EffectBase,
    compressor: Compressor,
    smoothers: [ParamSmoother; 6],
    post_gain_db: f32,
    /// Snapshot handed to the compressor on the last processed block
    current: CompressorParams,
}

impl CompressorEffect {
    /// Create a compressor effect with default settings
    pub fn new() -> Self {
        Self::from_config(&CompressorConfig::default())
    }

    /// Create a compressor effect from a loaded configuration
    pub fn from_config(config: &CompressorConfig) -> Self {
        let defaults = CompressorParams::default();
        let info = EffectInfo::new("Compressor", "Dynamics")
            .with_param(
                ParamInfo::new("Threshold", 0.0)
                    .with_range(-100.0, 0.0)
                    .with_default_actual(defaults.threshold_db)
                    .with_unit("dB"),
            )
            .with_param(
                ParamInfo::new("Ratio", 0.0)
                    .with_range(1.0, 20.0)
                    .with_default_actual(defaults.ratio)
                    .with_unit(":1"),
            )
            .with_param(
                ParamInfo::new("Knee", 0.0)
                    .with_range(0.0, 40.0)
                    .with_default_actual(defaults.knee_db)
                    .with_unit("dB"),
            )
            .with_param(
                ParamInfo::new("Attack", 0.0)
                    .with_range(0.0, 1.0)
                    .with_default_actual(defaults.attack_time)
                    .with_unit("s"),
            )
            .with_param(
                ParamInfo::new("Release", 0.0)
                    .with_range(0.0, 1.0)
                    .with_default_actual(defaults.release_time)
                    .with_unit("s"),
            )
            .with_param(
                ParamInfo::new("Mix", 1.0)
                    .with_range(0.0, 1.0)
                    .with_unit("%"),
            );

        let mut compressor = Compressor::new();
        compressor.set_pre_delay_time(config.pre_delay_time);

        let mut effect = Self {
            base: EffectBase::new(info),
            compressor,
            smoothers: std::array::from_fn(|_| ParamSmoother::new(config.smoothing_time)),
            post_gain_db: config.params.post_gain_db,
            current: config.params.sanitized(),
        };
        effect.apply_params(&config.params);
        effect
    }

    /// Set every host parameter from a snapshot (values clamp to the ranges)
    pub fn apply_params(&mut self, params: &CompressorParams) {
        let actual = [
            params.threshold_db,
            params.ratio,
            params.knee_db,
            params.attack_time,
            params.release_time,
            params.mix,
        ];
        for (param, value) in CompressorParam::ALL.iter().zip(actual) {
            self.base.set_param_actual(param.index(), value);
        }
        self.post_gain_db = params.post_gain_db;
    }

    /// Set one parameter from a value in its own range
    pub fn set_param_actual(&mut self, param: CompressorParam, value: f32) {
        self.base.set_param_actual(param.index(), value);
    }

    /// Gain applied after makeup, in dB
    pub fn set_post_gain_db(&mut self, db: f32) {
        self.post_gain_db = db;
    }

    /// Change the look-ahead time; takes effect immediately once prepared
    pub fn set_pre_delay_time(&mut self, seconds: f32) {
        self.compressor.set_pre_delay_time(seconds);
        self.base.info_mut().latency_samples = self.compressor.latency_frames() as u32;
    }

    /// Smoothed gain-reduction meter in dB
    pub fn metering_db(&self) -> f32 {
        self.compressor.metering_db()
    }

    /// Parameters used for the most recent block
    pub fn current_params(&self) -> &CompressorParams {
        &self.current
    }

    /// The wrapped compressor
    pub fn compressor(&self) -> &Compressor {
        &self.compressor
    }

    /// Advance the smoothers by one block and build the compressor snapshot
    fn smoothed_params(&mut self, frames: usize) -> CompressorParams {
        let sample_rate = self.compressor.sample_rate();
        let mut values = [0.0; 6];
        for (i, smoother) in self.smoothers.iter_mut().enumerate() {
            smoother.set_target(self.base.param_actual(i));
            values[i] = smoother.advance(frames, sample_rate);
        }

        CompressorParams {
            threshold_db: values[CompressorParam::Threshold.index()],
            ratio: values[CompressorParam::Ratio.index()],
            knee_db: values[CompressorParam::Knee.index()],
            attack_time: values[CompressorParam::Attack.index()],
            release_time: values[CompressorParam::Release.index()],
            post_gain_db: self.post_gain_db,
            mix: values[CompressorParam::Mix.index()],
        }
    }
}

impl Default for CompressorEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for CompressorEffect {
    fn prepare(&mut self, sample_rate: f32, channels: usize) -> DynamicsResult<()> {
        self.compressor.initialize(sample_rate, channels)?;
        for smoother in &mut self.smoothers {
            smoother.reset();
        }
        self.base.info_mut().latency_samples = self.compressor.latency_frames() as u32;
        log::info!(
            "{} prepared with {} samples latency",
            self.base.info().name,
            self.base.info().latency_samples
        );
        Ok(())
    }

    fn process(&mut self, buffer: &mut AudioBuffer) {
        if self.compressor.state() == CompressorState::Uninitialized {
            return;
        }

        if self.base.is_bypassed() {
            self.compressor.process_delay_only(buffer);
            return;
        }

        self.current = self.smoothed_params(buffer.frames());
        self.compressor.process(&self.current, buffer);
    }

    fn latency_samples(&self) -> u32 {
        self.compressor.latency_frames() as u32
    }

    fn info(&self) -> &EffectInfo {
        self.base.info()
    }

    fn get_params(&self) -> &[ParamValue] {
        self.base.get_params()
    }

    fn set_param(&mut self, index: usize, value: f32) {
        self.base.set_param(index, value);
    }

    fn set_bypass(&mut self, bypass: bool) {
        self.base.set_bypass(bypass);
    }

    fn is_bypassed(&self) -> bool {
        self.base.is_bypassed()
    }

    fn reset(&mut self) {
        self.compressor.reset();
        for smoother in &mut self.smoothers {
            smoother.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared() -> CompressorEffect {
        let mut effect = CompressorEffect::new();
        effect.prepare(48000.0, 2).unwrap();
        effect
    }

    #[test]
    fn test_compressor_info() {
        let effect = CompressorEffect::new();
        let info = effect.info();
        assert_eq!(info.name, "Compressor");
        assert_eq!(info.category, "Dynamics");
        assert_eq!(info.param_count(), 6);
        assert_eq!(info.params[CompressorParam::Mix.index()].name, "Mix");

        // Defaults survive the normalized round trip
        let params = effect.get_params();
        let defaults = CompressorParams::default();
        assert!((params[0].actual - defaults.threshold_db).abs() < 1e-4);
        assert!((params[1].actual - defaults.ratio).abs() < 1e-4);
        assert!((params[2].actual - defaults.knee_db).abs() < 1e-4);
        assert!((params[3].actual - defaults.attack_time).abs() < 1e-6);
        assert!((params[4].actual - defaults.release_time).abs() < 1e-6);
        assert_eq!(params[5].actual, 1.0);
    }

    #[test]
    fn test_prepare_reports_latency() {
        let mut effect = CompressorEffect::new();
        assert_eq!(effect.latency_samples(), 0);
        assert!(effect.prepare(0.0, 2).is_err());

        effect.prepare(48000.0, 2).unwrap();
        assert_eq!(effect.latency_samples(), 288);
        assert_eq!(effect.info().latency_samples, 288);

        effect.set_pre_delay_time(0.002);
        assert_eq!(effect.latency_samples(), 96);
        assert_eq!(effect.info().latency_samples, 96);
    }

    #[test]
    fn test_unprepared_process_is_noop() {
        let mut effect = CompressorEffect::new();
        let mut buffer = AudioBuffer::silence(2, 64);
        buffer.channel_mut(0).fill(0.9);
        effect.process(&mut buffer);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.9));
    }

    #[test]
    fn test_loud_input_is_compressed() {
        let mut effect = prepared();
        let mut buffer = AudioBuffer::silence(2, 512);
        for _ in 0..100 {
            buffer.channel_mut(0).fill(1.0);
            buffer.channel_mut(1).fill(1.0);
            effect.process(&mut buffer);
        }

        let out = buffer.sample(0, 511);
        assert!(out < 0.9, "full scale came out at {}", out);
        assert!(out > 0.5, "full scale came out at {}", out);
        assert!(effect.metering_db() < -3.0);
    }

    #[test]
    fn test_dry_mix_is_pure_delay() {
        let mut effect = prepared();
        effect.set_param(CompressorParam::Mix.index(), 0.0);

        let mut buffer = AudioBuffer::silence(2, 512);
        buffer.set_sample(0, 0, 1.0);
        buffer.set_sample(1, 1, -1.0);
        effect.process(&mut buffer);

        assert_eq!(buffer.sample(0, 288), 1.0);
        assert_eq!(buffer.sample(1, 289), -1.0);
        assert_eq!(buffer.peak(), 1.0);
    }

    #[test]
    fn test_bypass_keeps_latency() {
        let mut effect = prepared();
        effect.set_bypass(true);
        assert!(effect.is_bypassed());

        let mut buffer = AudioBuffer::silence(2, 512);
        buffer.set_sample(0, 10, 1.0);
        effect.process(&mut buffer);

        assert_eq!(effect.latency_samples(), 288);
        assert_eq!(buffer.sample(0, 298), 1.0);
        assert_eq!(buffer.peak(), 1.0);
    }

    #[test]
    fn test_parameter_changes_are_smoothed() {
        let mut effect = prepared();
        let mut buffer = AudioBuffer::silence(2, 512);
        effect.process(&mut buffer);
        assert!((effect.current_params().threshold_db - -24.0).abs() < 1e-4);

        effect.set_param_actual(CompressorParam::Threshold, -60.0);
        effect.process(&mut buffer);
        let threshold = effect.current_params().threshold_db;
        assert!(threshold < -24.0 && threshold > -60.0, "threshold {}", threshold);

        for _ in 0..100 {
            effect.process(&mut buffer);
        }
        assert!((effect.current_params().threshold_db - -60.0).abs() < 0.01);

        // Reset snaps straight to the target
        effect.set_param_actual(CompressorParam::Threshold, -10.0);
        effect.reset();
        effect.process(&mut buffer);
        assert_eq!(effect.current_params().threshold_db, effect.get_params()[0].actual);
    }

    #[test]
    fn test_from_config() {
        let config = CompressorConfig {
            params: CompressorParams {
                ratio: 4.0,
                post_gain_db: -3.0,
                ..Default::default()
            },
            pre_delay_time: 0.001,
            smoothing_time: 0.0,
        };

        let mut effect = CompressorEffect::from_config(&config);
        effect.prepare(48000.0, 1).unwrap();
        assert_eq!(effect.latency_samples(), 48);

        let mut buffer = AudioBuffer::silence(1, 64);
        effect.process(&mut buffer);
        let params = effect.current_params();
        assert!((params.ratio - 4.0).abs() < 1e-4);
        assert_eq!(params.post_gain_db, -3.0);
    }
}
