mod commands;
mod config;
mod error;
mod progress;
mod zoom;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info};

use mandelgrid_core::Pool;

use config::Config;
use zoom::ZoomOptions;

/// Compute Mandelbrot and Julia set grids and render them to images.
#[derive(Debug, Parser)]
#[command(name = "mandelgrid", version, about)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads per pass (defaults to one per CPU).
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ConfigArg {
    /// The configuration file (JSON).
    #[arg(short, long)]
    config: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate the grid and write it to the data file.
    Compute {
        #[command(flatten)]
        config: ConfigArg,
        /// Also render the image file.
        #[arg(long)]
        image: bool,
    },
    /// Render the image file from a previously computed data file.
    Colorize {
        #[command(flatten)]
        config: ConfigArg,
    },
    /// Evaluate and render in one step, without writing the data file.
    Render {
        #[command(flatten)]
        config: ConfigArg,
    },
    /// Render a sequence of frames zooming into the configured center.
    Zoom {
        #[command(flatten)]
        config: ConfigArg,
        /// Starting width of the plot.
        #[arg(long, default_value_t = 4.0)]
        width: f64,
        /// Width ratio between frames; 1.05 or 1.1 is usually right. Must be > 1.
        #[arg(long, default_value_t = 1.1)]
        zoom: f64,
        /// Iteration growth rate: iterations double every 1/ITER frames.
        #[arg(long, default_value_t = 0.02)]
        iter: f64,
        /// Show the frame schedule and exit without computing.
        #[arg(long)]
        info: bool,
    },
    /// Write a default configuration (and color ramp) to get started.
    DefaultConfig {
        #[arg(short, long, default_value = "default.json")]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .init();
}

fn load(arg: &ConfigArg) -> error::Result<Config> {
    let config = Config::load(&arg.config)?;
    debug!("Configuration:\n{config}");
    Ok(config)
}

fn run(cli: Cli) -> error::Result<()> {
    let pool = cli.workers.map(Pool::new).unwrap_or_default();
    debug!(workers = pool.workers(), "worker pool");

    match cli.command {
        Command::Compute { config, image } => commands::compute(&load(&config)?, &pool, image),
        Command::Colorize { config } => commands::colorize(&load(&config)?, &pool),
        Command::Render { config } => commands::render(&load(&config)?, &pool),
        Command::Zoom {
            config,
            width,
            zoom: zoom_factor,
            iter,
            info,
        } => {
            let opts = ZoomOptions {
                start_width: width,
                zoom: zoom_factor,
                iter_factor: iter,
                info_only: info,
            };
            zoom::run(&load(&config)?, &pool, &opts)
        }
        Command::DefaultConfig { output } => commands::default_config(&output),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    info!("Starting Mandelgrid");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
