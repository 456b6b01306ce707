//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. The helpers here load
//! the market shared by all of them.

pub mod calibrate;
pub mod check;
pub mod price;

use pricer_models::models::{BasketModel, CorrelationMatrix};
use pricer_pricing::mc::{EstimatorError, MonteCarloEstimator};
use pricer_pricing::rng::PricerRng;
use tracing::info;

use crate::config::CliConfig;
use crate::loader::MarketDataSet;
use crate::Result;

/// Loaded and validated market inputs
#[derive(Debug, Clone)]
pub struct Market {
    /// Raw data files
    pub data: MarketDataSet,
    /// Lognormal basket model
    pub model: BasketModel,
    /// Validated correlation matrix
    pub correlation: CorrelationMatrix<f64>,
}

/// Loads the data files and validates the model inputs.
pub fn load_market(config: &CliConfig) -> Result<Market> {
    let data = MarketDataSet::load(&config.data, config.market.dimension)?;
    let model = BasketModel::new(
        data.spots.clone(),
        data.sigmas.clone(),
        config.market.rate,
        config.market.horizon,
    )?;
    let correlation = data.correlation_matrix()?;
    info!(
        dimension = model.dimension(),
        horizon = model.horizon(),
        rate = model.rate(),
        "Market loaded"
    );
    Ok(Market {
        data,
        model,
        correlation,
    })
}

/// Seeded generator from the configuration, or from entropy.
pub fn make_rng(config: &CliConfig) -> PricerRng {
    let rng = match config.estimator.seed {
        Some(seed) => PricerRng::from_seed(seed),
        None => PricerRng::from_entropy(),
    };
    info!(seed = rng.seed(), "Random generator seeded");
    rng
}

/// Loads the market and runs the pilot calibration.
pub fn build_estimator(config: &CliConfig) -> Result<(Market, MonteCarloEstimator, u64)> {
    let market = load_market(config)?;
    let estimator_config = config
        .estimator_config(market.data.weights.clone())
        .map_err(EstimatorError::from)?;
    let rng = make_rng(config);
    let seed = rng.seed();
    let estimator = MonteCarloEstimator::from_market(
        estimator_config,
        market.model.clone(),
        &market.correlation,
        rng,
    )?;
    info!(
        plain = estimator.plain_sample_count(),
        antithetic = estimator.antithetic_sample_count(),
        "Estimator ready"
    );
    Ok((market, estimator, seed))
}


#[cfg(test)]
mod tests {
    use super::test_support::two_asset_config;
    use super::*;
    use crate::CliError;
    use tempfile::TempDir;

    #[test]
    fn test_load_market() {
        let dir = TempDir::new().unwrap();
        let config = two_asset_config(&dir);
        let market = load_market(&config).unwrap();
        assert_eq!(market.model.dimension(), 2);
        assert_eq!(market.correlation.get(0, 1), 0.5);
        assert_eq!(market.model.rate(), 0.05);
    }

    #[test]
    fn test_load_market_rejects_bad_spot() {
        let dir = TempDir::new().unwrap();
        let config = two_asset_config(&dir);
        std::fs::write(config.data.spot_path(), "100\n-1\n").unwrap();
        assert!(matches!(load_market(&config), Err(CliError::Model(_))));
    }

    #[test]
    fn test_make_rng_uses_configured_seed() {
        let mut config = CliConfig::default();
        config.estimator.seed = Some(99);
        assert_eq!(make_rng(&config).seed(), 99);
    }
}
