//! Compressor configuration

use serde::{Deserialize, Serialize};

use crate::compressor::{CompressorParams, DEFAULT_PRE_DELAY_TIME};
use crate::effect::DEFAULT_SMOOTHING_TIME;

/// Settings for one compressor instance
///
/// ```yaml
/// params:
///   threshold_db: -18.0
///   ratio: 4.0
/// pre_delay_time: 0.005
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// Initial parameter values
    pub params: CompressorParams,

    /// Look-ahead time in seconds
    /// Default: 0.006 (6 ms)
    pub pre_delay_time: f32,

    /// Parameter smoothing time constant in seconds (0 disables smoothing)
    /// Default: 0.02 (20 ms)
    pub smoothing_time: f32,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            params: CompressorParams::default(),
            pre_delay_time: DEFAULT_PRE_DELAY_TIME,
            smoothing_time: DEFAULT_SMOOTHING_TIME,
        }
    }
}
