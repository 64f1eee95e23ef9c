//! Configuration for compressor instances
//!
//! Settings live in YAML files shaped like [`CompressorConfig`]. Every field
//! is optional; missing fields take the compressor defaults.
//!
//! # Usage
//!
//! ```ignore
//! use dynamics_core::config::{load_config, read_config, CompressorConfig};
//!
//! // Lenient: falls back to defaults when the file is missing or broken
//! let config: CompressorConfig = load_config(&config_path);
//!
//! // Strict: the caller asked for this file, so report problems
//! let config: CompressorConfig = read_config(&config_path)?;
//! ```

mod compressor;
mod io;

pub use compressor::CompressorConfig;
pub use io::{load_config, read_config};
