//! Price report rendering.
//!
//! The table layout prints one block per estimator: a strike row, an
//! estimate row, then precision, number of simulations and computation
//! time in seconds.

use pricer_models::analytical::BlackScholes;
use pricer_models::models::BasketModel;
use pricer_pricing::mc::{EstimationMode, EstimationResult};
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

use crate::error::Result;

const RULE: &str =
    "-----------------------------------------------------------------------------";

/// Output format of the `price` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable table
    #[default]
    Table,
    /// JSON document
    Json,
}

/// One strike of a mode report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrikeRow {
    pub strike: f64,
    pub price: f64,
    pub std_error: f64,
    /// Closed-form forward value, single-asset baskets only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<f64>,
}

/// Result of one estimator run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeReport {
    pub mode: EstimationMode,
    pub precision: f64,
    pub sample_count: usize,
    pub elapsed_secs: f64,
    pub rows: Vec<StrikeRow>,
}

impl ModeReport {
    /// Builds the report of one run.
    ///
    /// With `discount` set, prices, errors and references are multiplied by it.
    pub fn from_result(
        result: &EstimationResult,
        elapsed: Duration,
        discount: Option<f64>,
        reference: Option<&ReferencePricer>,
    ) -> Self {
        let factor = discount.unwrap_or(1.0);
        let rows = result
            .estimates
            .iter()
            .map(|estimate| StrikeRow {
                strike: estimate.strike,
                price: estimate.price * factor,
                std_error: estimate.std_error * factor,
                reference: reference
                    .and_then(|r| r.forward_price(estimate.strike))
                    .map(|value| value * factor),
            })
            .collect();

        Self {
            mode: result.mode,
            precision: result.precision,
            sample_count: result.sample_count,
            elapsed_secs: elapsed.as_secs_f64(),
            rows,
        }
    }

    fn title(&self) -> &'static str {
        match self.mode {
            EstimationMode::Plain => "MC estimator",
            EstimationMode::Antithetic => "Antithetic method",
        }
    }
}

/// Full output of the `price` command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReport {
    pub dimension: usize,
    pub horizon: f64,
    pub rate: f64,
    pub seed: u64,
    pub pilot_variance: f64,
    /// Discount factor applied to the prices, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_factor: Option<f64>,
    pub modes: Vec<ModeReport>,
}

/// Closed-form forward value of a one-asset basket `a * S_T`.
///
/// `E[(a S_T - K)+] = a * E[(S_T - K/a)+]`, the forward Black-Scholes call
/// at strike `K/a`.
#[derive(Debug, Clone)]
pub struct ReferencePricer {
    weight: f64,
    horizon: f64,
    black_scholes: BlackScholes,
}

impl ReferencePricer {
    /// Reference for single-asset baskets with a positive weight.
    pub fn for_basket(model: &BasketModel, weights: &[f64]) -> Option<Self> {
        if model.dimension() != 1 || weights.len() != 1 || weights[0] <= 0.0 {
            return None;
        }
        let black_scholes =
            BlackScholes::new(model.spots()[0], model.rate(), model.volatilities()[0]).ok()?;
        Some(Self {
            weight: weights[0],
            horizon: model.horizon(),
            black_scholes,
        })
    }

    /// Undiscounted reference value for `strike`.
    pub fn forward_price(&self, strike: f64) -> Option<f64> {
        self.black_scholes
            .forward_call_price(strike / self.weight, self.horizon)
            .ok()
            .map(|value| self.weight * value)
    }
}

/// Decimal places that represent multiples of `precision` exactly enough.
fn decimals_for(precision: f64) -> usize {
    (0..=12)
        .find(|&k| {
            let scaled = precision * 10f64.powi(k as i32);
            (scaled - scaled.round()).abs() <= 1e-9 * scaled.abs().max(1.0)
        })
        .unwrap_or(12)
}

/// Renders the report as plain text tables.
pub fn render_table(report: &PriceReport) -> String {
    let mut out = String::new();
    for (index, mode) in report.modes.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        // `write!` into a String cannot fail
        let _ = writeln!(out, "{}", mode.title());
        let _ = writeln!(out);

        let decimals = if report.discount_factor.is_some() {
            decimals_for(mode.precision) + 2
        } else {
            decimals_for(mode.precision)
        };

        out.push_str("Strike\t|  ");
        for row in &mode.rows {
            let _ = write!(out, "{}\t\t", row.strike);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", RULE);

        out.push_str("Est.\t|  ");
        for row in &mode.rows {
            let _ = write!(out, "{:.*}\t\t", decimals, row.price);
        }
        let _ = writeln!(out);

        if mode.rows.iter().any(|row| row.reference.is_some()) {
            out.push_str("BS\t|  ");
            for row in &mode.rows {
                match row.reference {
                    Some(value) => {
                        let _ = write!(out, "{:.4}\t\t", value);
                    }
                    None => out.push_str("-\t\t"),
                }
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Precision:\t\t{}", mode.precision);
        let _ = writeln!(out, "Nb simulations:\t\t{}", mode.sample_count);
        let _ = writeln!(out, "Computation time:\t{:.3}", mode.elapsed_secs);
    }
    if let Some(df) = report.discount_factor {
        let _ = writeln!(out);
        let _ = writeln!(out, "Discounted by:\t\t{:.6}", df);
    }
    out
}

/// Renders the report as pretty-printed JSON.
pub fn render_json(report: &PriceReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_pricing::mc::StrikeEstimate;

    fn result(mode: EstimationMode) -> EstimationResult {
        EstimationResult {
            mode,
            precision: 0.1,
            sample_count: 1_234,
            estimates: vec![
                StrikeEstimate {
                    strike: 90.0,
                    price: 12.3,
                    std_error: 0.04,
                },
                StrikeEstimate {
                    strike: 110.0,
                    price: 1.7,
                    std_error: 0.02,
                },
            ],
        }
    }

    fn report(discount_factor: Option<f64>) -> PriceReport {
        let modes = [EstimationMode::Plain, EstimationMode::Antithetic]
            .into_iter()
            .map(|mode| {
                ModeReport::from_result(
                    &result(mode),
                    Duration::from_millis(250),
                    discount_factor,
                    None,
                )
            })
            .collect();
        PriceReport {
            dimension: 2,
            horizon: 1.0,
            rate: 0.1,
            seed: 42,
            pilot_variance: 64.0,
            discount_factor,
            modes,
        }
    }

    #[test]
    fn test_decimals_for_precision() {
        assert_eq!(decimals_for(1.0), 0);
        assert_eq!(decimals_for(0.5), 1);
        assert_eq!(decimals_for(0.1), 1);
        assert_eq!(decimals_for(0.05), 2);
        assert_eq!(decimals_for(0.001), 3);
    }

    #[test]
    fn test_render_table_layout() {
        let text = render_table(&report(None));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "MC estimator");
        assert_eq!(lines[2], "Strike\t|  90\t\t110\t\t");
        assert_eq!(lines[3], RULE);
        assert_eq!(lines[4], "Est.\t|  12.3\t\t1.7\t\t");
        assert_eq!(lines[6], "Precision:\t\t0.1");
        assert_eq!(lines[7], "Nb simulations:\t\t1234");
        assert_eq!(lines[8], "Computation time:\t0.250");
        assert!(lines.contains(&"Antithetic method"));
        assert!(!text.contains("Discounted by"));
    }

    #[test]
    fn test_discounted_report() {
        let df = (-0.1_f64).exp();
        let report = report(Some(df));
        assert_relative_eq!(report.modes[0].rows[0].price, 12.3 * df, epsilon = 1e-12);
        assert_relative_eq!(report.modes[0].rows[0].std_error, 0.04 * df, epsilon = 1e-12);
        assert!(render_table(&report).contains("Discounted by:"));
    }

    #[test]
    fn test_reference_only_for_single_asset() {
        let single = BasketModel::new(vec![100.0], vec![0.2], 0.05, 1.0).unwrap();
        let pair = BasketModel::new(vec![100.0, 100.0], vec![0.2, 0.2], 0.05, 1.0).unwrap();
        assert!(ReferencePricer::for_basket(&pair, &[0.5, 0.5]).is_none());
        assert!(ReferencePricer::for_basket(&single, &[-1.0]).is_none());

        // Doubling the weight doubles the payoff at doubled strike
        let unit = ReferencePricer::for_basket(&single, &[1.0]).unwrap();
        let double = ReferencePricer::for_basket(&single, &[2.0]).unwrap();
        let base = unit.forward_price(100.0).unwrap();
        assert_relative_eq!(double.forward_price(200.0).unwrap(), 2.0 * base, epsilon = 1e-10);
        assert_relative_eq!(base, 10.4506 * 0.05_f64.exp(), epsilon = 1e-3);
    }

    #[test]
    fn test_reference_column_rendered() {
        let model = BasketModel::new(vec![100.0], vec![0.2], 0.05, 1.0).unwrap();
        let reference = ReferencePricer::for_basket(&model, &[1.0]);
        let mode = ModeReport::from_result(
            &result(EstimationMode::Plain),
            Duration::from_secs(1),
            None,
            reference.as_ref(),
        );
        assert!(mode.rows.iter().all(|row| row.reference.is_some()));

        let report = PriceReport {
            dimension: 1,
            horizon: 1.0,
            rate: 0.05,
            seed: 1,
            pilot_variance: 1.0,
            discount_factor: None,
            modes: vec![mode],
        };
        assert!(render_table(&report).contains("BS\t|  "));
    }

    #[test]
    fn test_render_json_fields() {
        let json = render_json(&report(None)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["seed"], 42);
        assert_eq!(value["modes"][0]["mode"], "plain");
        assert_eq!(value["modes"][1]["mode"], "antithetic");
        assert_eq!(value["modes"][0]["sample_count"], 1234);
        assert_eq!(value["modes"][0]["rows"][0]["strike"], 90.0);
        assert!(value.get("discount_factor").is_none());
        assert!(value["modes"][0]["rows"][0].get("reference").is_none());
    }
}
