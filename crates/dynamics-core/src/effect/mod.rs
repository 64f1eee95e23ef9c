//! Effect system - host-facing trait and parameter mapping
//!
//! Hosts drive effects through normalized (0.0-1.0) parameters and a
//! prepare/process/reset lifecycle. Each effect maps the normalized values
//! onto its own ranges and smooths them per block before the DSP sees them.

pub mod compressor;
pub mod smoothing;

pub use compressor::{CompressorEffect, CompressorParam};
pub use smoothing::{ParamSmoother, DEFAULT_SMOOTHING_TIME};

use crate::error::DynamicsResult;
use crate::types::AudioBuffer;

/// Information about an effect parameter
#[derive(Debug, Clone)]
pub struct ParamInfo {
    /// Parameter name for display
    pub name: String,
    /// Default value (0.0-1.0)
    pub default: f32,
    /// Value at normalized 0.0
    pub min: f32,
    /// Value at normalized 1.0
    pub max: f32,
    /// Unit label (e.g., "ms", "dB", "%")
    pub unit: String,
}

impl Default for ParamInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            default: 0.5,
            min: 0.0,
            max: 1.0,
            unit: String::new(),
        }
    }
}

impl ParamInfo {
    /// Create a new parameter info with name and normalized default
    pub fn new(name: impl Into<String>, default: f32) -> Self {
        Self {
            name: name.into(),
            default,
            ..Default::default()
        }
    }

    /// Set the value range
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the default from a value in the parameter's own range
    ///
    /// Call after [`with_range`](Self::with_range).
    pub fn with_default_actual(mut self, actual: f32) -> Self {
        self.default = self.normalize(actual);
        self
    }

    /// Set the unit label
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Map an actual value onto 0.0-1.0 (clamped)
    pub fn normalize(&self, actual: f32) -> f32 {
        let span = self.max - self.min;
        if span == 0.0 {
            return 0.0;
        }
        ((actual - self.min) / span).clamp(0.0, 1.0)
    }

    /// Map a normalized value onto the parameter range
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

/// Current parameter value
#[derive(Debug, Clone, Copy)]
pub struct ParamValue {
    /// Normalized value (0.0-1.0)
    pub normalized: f32,
    /// Actual value after range mapping
    pub actual: f32,
}

impl Default for ParamValue {
    fn default() -> Self {
        Self {
            normalized: 0.5,
            actual: 0.5,
        }
    }
}

impl ParamValue {
    /// Create a new parameter value
    pub fn new(normalized: f32, actual: f32) -> Self {
        Self { normalized, actual }
    }

    /// Create from normalized value with the given param info
    pub fn from_normalized(normalized: f32, info: &ParamInfo) -> Self {
        let normalized = normalized.clamp(0.0, 1.0);
        Self {
            normalized,
            actual: info.denormalize(normalized),
        }
    }

    /// Create from an actual value, clamped into the param range
    pub fn from_actual(actual: f32, info: &ParamInfo) -> Self {
        Self::from_normalized(info.normalize(actual), info)
    }
}

/// Information about an effect
#[derive(Debug, Clone)]
pub struct EffectInfo {
    /// Effect name for display
    pub name: String,
    /// Effect category (e.g., "Dynamics", "Utility")
    pub category: String,
    /// Parameter descriptions, indexed as in `set_param`
    pub params: Vec<ParamInfo>,
    /// Processing latency in samples
    pub latency_samples: u32,
}

impl EffectInfo {
    /// Create a new effect info
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            params: Vec::new(),
            latency_samples: 0,
        }
    }

    /// Add a parameter to this effect
    pub fn with_param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    /// Get the number of parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// The core effect trait - implemented by all audio effects
///
/// Effects process planar buffers in place and report their latency so the
/// host can compensate. All parameters are normalized (0.0-1.0).
pub trait Effect: Send {
    /// Allocate and configure for a stream format
    ///
    /// Called from the control thread before the first `process` and again
    /// whenever the format changes.
    fn prepare(&mut self, sample_rate: f32, channels: usize) -> DynamicsResult<()>;

    /// Process a buffer in-place
    fn process(&mut self, buffer: &mut AudioBuffer);

    /// Get the latency of this effect in samples
    fn latency_samples(&self) -> u32;

    /// Get information about this effect (name, category, parameters)
    fn info(&self) -> &EffectInfo;

    /// Get the current parameter values
    fn get_params(&self) -> &[ParamValue];

    /// Set a parameter by index (normalized value 0.0-1.0)
    fn set_param(&mut self, index: usize, value: f32);

    /// Set the bypass state
    fn set_bypass(&mut self, bypass: bool);

    /// Check if the effect is bypassed
    fn is_bypassed(&self) -> bool;

    /// Reset the effect state (called on transport stop, seek, etc.)
    fn reset(&mut self);
}

/// Base implementation helper for effects
///
/// Provides common functionality like bypass state and parameter storage.
#[derive(Debug, Clone)]
pub struct EffectBase {
    info: EffectInfo,
    params: Vec<ParamValue>,
    bypassed: bool,
}

impl EffectBase {
    /// Create a new effect base from effect info
    pub fn new(info: EffectInfo) -> Self {
        let params: Vec<ParamValue> = info
            .params
            .iter()
            .map(|p| ParamValue::from_normalized(p.default, p))
            .collect();
        Self {
            info,
            params,
            bypassed: false,
        }
    }

    /// Get the effect info
    pub fn info(&self) -> &EffectInfo {
        &self.info
    }

    /// Get mutable access to the effect info
    ///
    /// Used to publish a new latency after `prepare`.
    pub fn info_mut(&mut self) -> &mut EffectInfo {
        &mut self.info
    }

    /// Get the current parameter values
    pub fn get_params(&self) -> &[ParamValue] {
        &self.params
    }

    /// Set a parameter value (normalized)
    pub fn set_param(&mut self, index: usize, value: f32) {
        if index < self.params.len() {
            self.params[index] = ParamValue::from_normalized(value, &self.info.params[index]);
        }
    }

    /// Set a parameter from a value in its own range
    pub fn set_param_actual(&mut self, index: usize, actual: f32) {
        if index < self.params.len() {
            self.params[index] = ParamValue::from_actual(actual, &self.info.params[index]);
        }
    }

    /// Get a parameter's actual (denormalized) value
    pub fn param_actual(&self, index: usize) -> f32 {
        self.params.get(index).map(|p| p.actual).unwrap_or(0.0)
    }

    /// Get a parameter's normalized value
    pub fn param_normalized(&self, index: usize) -> f32 {
        self.params.get(index).map(|p| p.normalized).unwrap_or(0.0)
    }

    /// Set bypass state
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypassed = bypass;
    }

    /// Check if bypassed
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }
}
