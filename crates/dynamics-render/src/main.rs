//! Dynamics Render - run a WAV file through the look-ahead compressor
//!
//! Reads the input, processes it block by block exactly as a live host would,
//! and writes the result in the input's sample format.
//!
//! Settings come from an optional YAML file (`--config`) and are then
//! overridden by any parameter flags. Set RUST_LOG=debug for verbose output.

mod render;
mod wav;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dynamics_core::config::{read_config, CompressorConfig};
use dynamics_core::effect::{CompressorEffect, Effect};
use render::{render, RenderOptions};

/// Render a WAV file through the look-ahead compressor
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// YAML compressor configuration
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Threshold in dB
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<f32>,

    /// Compression ratio (N:1)
    #[arg(long)]
    ratio: Option<f32>,

    /// Knee width in dB
    #[arg(long)]
    knee: Option<f32>,

    /// Attack time in seconds
    #[arg(long)]
    attack: Option<f32>,

    /// Release time in seconds
    #[arg(long)]
    release: Option<f32>,

    /// Post gain in dB
    #[arg(long, allow_negative_numbers = true)]
    post_gain: Option<f32>,

    /// Wet/dry mix (0.0 = dry, 1.0 = fully compressed)
    #[arg(long)]
    mix: Option<f32>,

    /// Look-ahead time in milliseconds
    #[arg(long)]
    pre_delay_ms: Option<f32>,

    /// Frames per processing block
    #[arg(short = 'b', long, default_value_t = 512)]
    block_size: usize,

    /// Remove the look-ahead delay so output lines up with input
    #[arg(long)]
    compensate_latency: bool,

    /// Run with the compressor bypassed (delay only)
    #[arg(long)]
    bypass: bool,
}

impl Args {
    /// Config file (if any) with command-line overrides applied
    fn compressor_config(&self) -> Result<CompressorConfig> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => CompressorConfig::default(),
        };

        let params = &mut config.params;
        let overrides = [
            (self.threshold, &mut params.threshold_db),
            (self.ratio, &mut params.ratio),
            (self.knee, &mut params.knee_db),
            (self.attack, &mut params.attack_time),
            (self.release, &mut params.release_time),
            (self.post_gain, &mut params.post_gain_db),
            (self.mix, &mut params.mix),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        if let Some(ms) = self.pre_delay_ms {
            config.pre_delay_time = ms / 1000.0;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let config = args.compressor_config()?;
    log::debug!("Compressor config: {:?}", config);

    let input = wav::read_wav(&args.input)?;
    log::info!(
        "Loaded {:?}: {} frames, {} channel(s) at {} Hz",
        args.input,
        input.buffer.frames(),
        input.buffer.channels(),
        input.spec.sample_rate
    );

    let mut effect = CompressorEffect::from_config(&config);
    effect
        .prepare(input.spec.sample_rate as f32, input.buffer.channels())
        .context("Failed to prepare compressor")?;
    effect.set_bypass(args.bypass);

    let options = RenderOptions {
        block_size: args.block_size,
        compensate_latency: args.compensate_latency,
    };
    let (output, summary) = render(&mut effect, &input.buffer, &options)?;

    wav::write_wav(&args.output, &output, input.spec)?;

    log::info!(
        "Rendered {} frames x {} channel(s) in {} blocks to {:?}",
        summary.frames,
        summary.channels,
        summary.blocks,
        args.output
    );
    log::info!(
        "Latency {} frames ({}), meter final {:.2} dB, deepest {:.2} dB",
        summary.latency_frames,
        if args.compensate_latency { "compensated" } else { "not compensated" },
        summary.final_meter_db,
        summary.min_meter_db
    );

    Ok(())
}
