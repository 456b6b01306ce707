//! Check command implementation
//!
//! Validates configuration, data files and the correlation factorisation
//! without drawing a single simulation.

use tracing::info;

use super::load_market;
use crate::config::CliConfig;
use crate::Result;

/// Summary of a successful check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSummary {
    /// Basket dimension
    pub dimension: usize,
    /// Sum of the basket weights
    pub weight_sum: f64,
    /// Number of strikes to price
    pub strikes: usize,
}

/// Validates every input the price command needs.
pub fn execute(config: &CliConfig) -> Result<CheckSummary> {
    let market = load_market(config)?;
    config
        .estimator_config(market.data.weights.clone())
        .map_err(pricer_pricing::mc::EstimatorError::from)?;
    market
        .correlation
        .covariance_cholesky(market.model.horizon())?;

    Ok(CheckSummary {
        dimension: market.data.dimension(),
        weight_sum: market.data.weights.iter().sum(),
        strikes: config.estimator.strikes.len(),
    })
}

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    info!("Checking configuration and market data...");
    let summary = execute(config)?;

    println!("Data directory:\t{}", config.data.dir.display());
    println!("Dimension:\t{}", summary.dimension);
    println!("Weight sum:\t{}", summary.weight_sum);
    println!("Strikes:\t{}", summary.strikes);
    println!("Status:\t\tOK");

    info!("Check complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::two_asset_config;
    use crate::CliError;
    use tempfile::TempDir;

    #[test]
    fn test_check_ok() {
        let dir = TempDir::new().unwrap();
        let config = two_asset_config(&dir);
        let summary = execute(&config).unwrap();
        assert_eq!(
            summary,
            CheckSummary {
                dimension: 2,
                weight_sum: 1.0,
                strikes: 3,
            }
        );
    }

    #[test]
    fn test_check_rejects_indefinite_correlation() {
        let dir = TempDir::new().unwrap();
        let mut config = two_asset_config(&dir);
        std::fs::write(config.data.correlation_path(), "1 0.9 -0.9\n0.9 1 0.9\n-0.9 0.9 1\n")
            .unwrap();
        std::fs::write(config.data.weights_path(), "0.3 0.3 0.4").unwrap();
        std::fs::write(config.data.spot_path(), "100 100 100").unwrap();
        std::fs::write(config.data.sigma_path(), "0.2 0.2 0.2").unwrap();
        config.market.dimension = None;

        assert!(matches!(execute(&config), Err(CliError::Correlation(_))));
    }

    #[test]
    fn test_check_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = two_asset_config(&dir);
        std::fs::remove_file(config.data.sigma_path()).unwrap();
        assert!(matches!(execute(&config), Err(CliError::Loader(_))));
    }
}
