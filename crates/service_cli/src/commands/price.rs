//! Price command implementation
//!
//! Loads the market, calibrates the estimator and prices every configured
//! strike with the selected estimators.

use pricer_pricing::mc::EstimationMode;
use std::time::Instant;
use tracing::info;

use super::build_estimator;
use crate::config::CliConfig;
use crate::report::{self, ModeReport, OutputFormat, PriceReport, ReferencePricer};
use crate::Result;

/// Estimators run by the price command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ModeSelection {
    /// Plain estimator only
    Plain,
    /// Antithetic estimator only
    Antithetic,
    /// Plain then antithetic
    #[default]
    Both,
}

impl ModeSelection {
    fn modes(self) -> &'static [EstimationMode] {
        match self {
            Self::Plain => &[EstimationMode::Plain],
            Self::Antithetic => &[EstimationMode::Antithetic],
            Self::Both => &[EstimationMode::Plain, EstimationMode::Antithetic],
        }
    }
}

/// Options of the price command
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceOptions {
    /// Estimators to run
    pub mode: ModeSelection,
    /// Output format
    pub format: OutputFormat,
    /// Multiply prices by `exp(-rT)`
    pub discounted: bool,
}

/// Prices the configured basket and returns the report.
pub fn execute(config: &CliConfig, options: PriceOptions) -> Result<PriceReport> {
    let (market, mut estimator, seed) = build_estimator(config)?;
    let reference = ReferencePricer::for_basket(&market.model, &market.data.weights);
    let discount = options
        .discounted
        .then(|| market.model.discount_factor());

    let mut modes = Vec::with_capacity(2);
    for &mode in options.mode.modes() {
        let start = Instant::now();
        let result = estimator.estimate(mode, None)?;
        let elapsed = start.elapsed();
        info!(%mode, samples = result.sample_count, elapsed_secs = elapsed.as_secs_f64(), "Estimation complete");
        modes.push(ModeReport::from_result(
            &result,
            elapsed,
            discount,
            reference.as_ref(),
        ));
    }

    Ok(PriceReport {
        dimension: market.model.dimension(),
        horizon: market.model.horizon(),
        rate: market.model.rate(),
        seed,
        pilot_variance: estimator.calibration().pilot_variance(),
        discount_factor: discount,
        modes,
    })
}

/// Run the price command
pub fn run(config: &CliConfig, options: PriceOptions) -> Result<()> {
    info!("Starting pricing...");
    info!("  Data directory: {}", config.data.dir.display());
    info!("  Precision: {}", config.estimator.precision);
    info!("  Strikes: {:?}", config.estimator.strikes);

    let report = execute(config, options)?;

    match options.format {
        OutputFormat::Table => print!("{}", report::render_table(&report)),
        OutputFormat::Json => println!("{}", report::render_json(&report)?),
    }

    info!("Pricing complete");
    Ok(())
}
