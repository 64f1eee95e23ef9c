//! Dynamics Core - look-ahead compressor and its host-facing effect
//!
//! - [`compressor`]: the real-time DSP (static curve, look-ahead, detector,
//!   adaptive envelope, metering)
//! - [`effect`]: normalized parameter model and the `Effect` trait
//! - [`config`]: YAML configuration

pub mod compressor;
pub mod config;
pub mod effect;
pub mod error;
pub mod types;

pub use compressor::{Compressor, CompressorParams, CompressorState};
pub use error::{DynamicsError, DynamicsResult};
pub use types::*;
