//! basket-mc - Monte Carlo pricer for European basket calls
//!
//! Prices calls on a weighted basket of correlated lognormal assets to a
//! target precision, with the plain and the antithetic estimator.
//!
//! # Commands
//!
//! - `basket-mc price` - Price every configured strike
//! - `basket-mc calibrate` - Run the pilot and print the sample counts
//! - `basket-mc check` - Validate configuration and market data
//!
//! # Configuration
//!
//! Defaults, then `basket.toml` (or `--config`), then `BASKET_*`
//! environment variables, then command line flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod loader;
mod report;

pub use error::{CliError, Result};

use commands::price::{ModeSelection, PriceOptions};
use config::{build_config, CliArgs};
use report::OutputFormat;

/// Monte Carlo pricer for European basket calls
#[derive(Parser)]
#[command(name = "basket-mc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (default: basket.toml when present)
    #[arg(short, long, global = true, env = "BASKET_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the market data files
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price the basket call for every configured strike
    Price {
        /// Target precision of each price
        #[arg(short, long)]
        precision: Option<f64>,

        /// Estimators to run
        #[arg(short, long, value_enum, default_value_t = ModeSelection::Both)]
        mode: ModeSelection,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Random seed for reproducible prices
        #[arg(short, long)]
        seed: Option<u64>,

        /// Cap on the calibrated sample counts
        #[arg(long)]
        max_samples: Option<usize>,

        /// Report prices discounted by exp(-rT)
        #[arg(long)]
        discounted: bool,
    },

    /// Run the pilot simulation and print the sample counts
    Calibrate {
        /// Target precision of each price
        #[arg(short, long)]
        precision: Option<f64>,

        /// Random seed for the pilot
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Validate configuration, data files and the correlation matrix
    Check,
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut args = CliArgs {
        config_file: cli.config.clone(),
        data_dir: cli.data_dir.clone(),
        log_level: cli.log_level.clone(),
        ..CliArgs::default()
    };
    if cli.verbose {
        args.log_level = Some("debug".to_string());
    }
    match &cli.command {
        Commands::Price {
            precision,
            seed,
            max_samples,
            ..
        } => {
            args.precision = *precision;
            args.seed = *seed;
            args.max_samples = *max_samples;
        }
        Commands::Calibrate {
            precision, seed, ..
        } => {
            args.precision = *precision;
            args.seed = *seed;
        }
        Commands::Check => {}
    }

    let config = build_config(&args)?;
    init_tracing(config.log_level.as_filter_str());

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Price {
            mode,
            format,
            discounted,
            ..
        } => commands::price::run(
            &config,
            PriceOptions {
                mode,
                format,
                discounted,
            },
        ),
        Commands::Calibrate { format, .. } => commands::calibrate::run(&config, format),
        Commands::Check => commands::check::run(&config),
    }
}
