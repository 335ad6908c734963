//! Cadence CLI - inspect time mappings and run particle scenes headless

mod commands;

use anyhow::Result;
use cadence_animation::RepeatType;
use clap::{Parser, Subcommand};
use commands::{simulate, timemap};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Animation timelines and particle simulation from the command line", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the local time a controller sees for a range of global times
    Timemap {
        /// Global times to map; when empty, samples --from..=--to by --step
        #[arg(allow_hyphen_values = true)]
        times: Vec<f32>,

        /// Repeat mode (clamp, cycle, or oscillate)
        #[arg(long, default_value = "clamp")]
        repeat: RepeatType,

        /// Local interval start
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        min: f32,

        /// Local interval end
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        max: f32,

        /// Global time at which the local timeline starts
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        start: f32,

        /// Local seconds per global second
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        rate: f32,

        /// First global time to sample
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        from: f32,

        /// Last global time to sample
        #[arg(long, default_value = "3", allow_hyphen_values = true)]
        to: f32,

        /// Global time between samples
        #[arg(long, default_value = "0.25")]
        step: f32,
    },

    /// Run a particle scene and report population and centroid
    Simulate {
        /// Path to scene TOML file
        scene: String,

        /// Number of frames to run
        #[arg(long, default_value = "240")]
        frames: u32,

        /// Frames per second of global time
        #[arg(long, default_value = "60")]
        fps: f32,

        /// Report every N frames
        #[arg(long, default_value = "30")]
        every: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    match cli.command {
        Commands::Timemap {
            times,
            repeat,
            min,
            max,
            start,
            rate,
            from,
            to,
            step,
        } => timemap::run(timemap::TimemapArgs {
            times,
            repeat,
            min,
            max,
            start,
            rate,
            from,
            to,
            step,
        }),
        Commands::Simulate {
            scene,
            frames,
            fps,
            every,
        } => simulate::run(simulate::SimulateArgs {
            scene,
            frames,
            fps,
            every,
        }),
    }
}
