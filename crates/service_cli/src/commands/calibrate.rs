//! Calibrate command implementation
//!
//! Runs only the pilot simulation and reports the sample counts the
//! estimators would use at the configured precision.

use pricer_pricing::mc::Calibration;
use tracing::{info, warn};

use super::build_estimator;
use crate::config::CliConfig;
use crate::report::OutputFormat;
use crate::Result;

/// Runs the pilot and returns its calibration.
pub fn execute(config: &CliConfig) -> Result<Calibration> {
    let (_, estimator, _) = build_estimator(config)?;
    let calibration = estimator.calibration().clone();
    if calibration.is_capped() {
        warn!("Sample counts were capped by max_samples");
    }
    Ok(calibration)
}

/// Run the calibrate command
pub fn run(config: &CliConfig, format: OutputFormat) -> Result<()> {
    info!("Starting calibration...");
    let calibration = execute(config)?;

    match format {
        OutputFormat::Table => {
            println!("Precision:\t\t{}", config.estimator.precision);
            println!("Pilot simulations:\t{}", calibration.pilot_samples());
            println!("Pilot mean:\t\t{:.6}", calibration.pilot_mean());
            println!("Pilot variance:\t\t{:.6}", calibration.pilot_variance());
            println!("Nb simulations:\t\t{}", calibration.plain_samples());
            println!("Nb antithetic pairs:\t{}", calibration.antithetic_samples());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&calibration)?),
    }

    info!("Calibration complete");
    Ok(())
}
