//! vfx - Frame layer pipeline diagnostics
//!
//! Inspects palettes, builds blank layers and runs a synthetic
//! decode/convert/consume pipeline with per-stage timing.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vfx_core::{Gamma, Palette};

mod commands;

#[derive(Parser)]
#[command(name = "vfx")]
#[command(author, version, about = "Frame layer pipeline diagnostics")]
#[command(long_about = "
Inspect the pixel palettes and layer lifecycle used by the VFX-RS playback
pipeline.

Examples:
  vfx palettes                          # List every palette
  vfx palettes -W 1920 -H 1080          # ... with plane sizes at 1080p
  vfx blank -W 720 -H 480 -p rgb24      # Describe a blank layer
  vfx simulate -n 240 -p yuv420p --convert rgba32
  vfx simulate -n 100 --cancel-every 7 -v
  vfx config --config layers.yaml       # Show effective layer config
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Layer config file (YAML); VFX_LAYER_* variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List palettes with their plane layout
    #[command(visible_alias = "p")]
    Palettes(PalettesArgs),

    /// Create a blank layer and describe it
    #[command(visible_alias = "b")]
    Blank(BlankArgs),

    /// Run a synthetic producer/consumer pipeline
    #[command(visible_alias = "sim")]
    Simulate(SimulateArgs),

    /// Print the effective layer config as YAML
    Config,
}

#[derive(Args)]
struct PalettesArgs {
    /// Frame width in pixels, to show plane sizes
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Frame height in pixels
    #[arg(short = 'H', long, default_value = "1")]
    height: u32,
}

#[derive(Args)]
struct BlankArgs {
    /// Width in pixels
    #[arg(short = 'W', long, default_value = "720")]
    width: u32,

    /// Height in pixels
    #[arg(short = 'H', long, default_value = "480")]
    height: u32,

    /// Pixel palette
    #[arg(short, long, default_value = "rgb24")]
    palette: Palette,

    /// Gamma tag
    #[arg(short, long, default_value = "srgb")]
    gamma: Gamma,

    /// Fill with palette-correct black instead of zeros
    #[arg(long)]
    black: bool,
}

#[derive(Args)]
struct SimulateArgs {
    /// Number of frames
    #[arg(short = 'n', long, default_value = "120")]
    frames: i64,

    /// Width in pixels
    #[arg(short = 'W', long, default_value = "1920")]
    width: u32,

    /// Height in pixels
    #[arg(short = 'H', long, default_value = "1080")]
    height: u32,

    /// Palette the source produces
    #[arg(short, long, default_value = "yuv420p")]
    palette: Palette,

    /// Convert each frame to this palette before it is ready
    #[arg(long)]
    convert: Option<Palette>,

    /// Cancel every Nth frame before it loads
    #[arg(long)]
    cancel_every: Option<i64>,

    /// Clip id stamped on every layer
    #[arg(long, default_value = "1")]
    clip: i32,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "vfx_layer=debug,vfx=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Palettes(args) => commands::palettes::run(args, cli.verbose),
        Commands::Blank(args) => commands::blank::run(args, config, cli.verbose),
        Commands::Simulate(args) => commands::simulate::run(args, config, cli.verbose),
        Commands::Config => commands::print_config(&config),
    }
}
