//! End-to-end sales forecasting pipeline.
//!
//! [`run_pipeline`] takes raw records and returns everything a caller needs
//! to present a forecast: the monthly series, its decomposition, the two
//! fitted smoothing models, a backtest on the most recent months and the
//! forecast itself. Each stage takes immutable inputs and returns new
//! values; a failure aborts the run and names the stage it came from.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{ComponentType, Forecast, SalesRecord, TimeSeries};
use crate::error::{ForecastError, PipelineStage, Result};
use crate::ingest::build_monthly_series;
use crate::models::{Forecaster, HoltWinters, SmoothingModel};
use crate::seasonality::{ClassicalDecomposition, DecompositionResult};
use crate::utils::cross_validation::train_test_split;
use crate::utils::metrics::{evaluate, EvaluationMetrics};
use crate::utils::optimization::SolverKind;

/// How the multiplicative model is scored against the test window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backtest {
    /// One-step-ahead predictions of the model fitted on the full series.
    #[default]
    InSample,
    /// Refit on the training window and forecast the test window.
    Holdout,
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Observations per seasonal cycle (default: 12).
    pub seasonal_period: usize,
    /// Months to forecast (default: 24).
    pub horizon: usize,
    /// Share of the series used for training in the backtest (default: 0.8).
    pub train_ratio: f64,
    pub backtest: Backtest,
    pub solver: SolverKind,
    /// Trend mode of the multiplicative-season model (default: additive).
    pub multiplicative_trend: ComponentType,
    /// Prediction interval coverage; `None` disables intervals.
    pub interval_level: Option<f64>,
    /// Run decomposition and both fits concurrently (default: true).
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seasonal_period: 12,
            horizon: 24,
            train_ratio: 0.8,
            backtest: Backtest::InSample,
            solver: SolverKind::NelderMead,
            multiplicative_trend: ComponentType::Additive,
            interval_level: Some(0.95),
            parallel: true,
        }
    }
}

impl PipelineConfig {
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_train_ratio(mut self, ratio: f64) -> Self {
        self.train_ratio = ratio;
        self
    }

    pub fn with_backtest(mut self, backtest: Backtest) -> Self {
        self.backtest = backtest;
        self
    }

    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_interval_level(mut self, level: Option<f64>) -> Self {
        self.interval_level = level;
        self
    }

    /// Run every stage on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check the settings before any data is touched.
    pub fn validate(&self) -> Result<()> {
        if self.seasonal_period < 2 {
            return Err(ForecastError::Validation(format!(
                "seasonal period must be at least 2, got {}",
                self.seasonal_period
            )));
        }
        if self.horizon == 0 {
            return Err(ForecastError::Validation(
                "forecast horizon must be positive".to_string(),
            ));
        }
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(ForecastError::Validation(format!(
                "train ratio must be in (0, 1), got {}",
                self.train_ratio
            )));
        }
        if let Some(level) = self.interval_level {
            if !(level > 0.0 && level < 1.0) {
                return Err(ForecastError::Validation(format!(
                    "interval level must be in (0, 1), got {level}"
                )));
            }
        }
        Ok(())
    }
}

/// Accuracy of the multiplicative model on the most recent months.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub mode: Backtest,
    pub train_len: usize,
    pub test_len: usize,
    pub actual: TimeSeries,
    pub predicted: TimeSeries,
    pub metrics: EvaluationMetrics,
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    /// Aggregated, calendar-complete monthly sales.
    pub series: TimeSeries,
    pub decomposition: DecompositionResult,
    /// Additive trend and season, fitted on the full series.
    pub additive: SmoothingModel,
    /// Multiplicative season, fitted on the full series.
    pub multiplicative: SmoothingModel,
    /// Extrapolation of the multiplicative model.
    pub forecast: Forecast,
    pub backtest: BacktestReport,
}

/// Run the full pipeline over raw records.
///
/// # Errors
/// Configuration problems are reported as `Validation`. Everything else is
/// wrapped in [`ForecastError::Stage`] naming the failing stage; when
/// several concurrent stages fail, decomposition is reported first, then
/// the additive fit, then the multiplicative fit.
///
/// # Example
/// ```
/// use sales_forecast::core::SalesRecord;
/// use sales_forecast::pipeline::{run_pipeline, PipelineConfig};
///
/// let records: Vec<SalesRecord> = (0..36)
///     .map(|t| {
///         let amount = 1000.0 + 20.0 * t as f64 + 150.0 * ((t % 12) as f64 - 5.5).abs();
///         SalesRecord::new(2021 + t / 12, (t % 12) as u32 + 1, Some(amount))
///     })
///     .collect();
///
/// let report = run_pipeline(&records, &PipelineConfig::default()).unwrap();
/// assert_eq!(report.forecast.horizon(), 24);
/// assert_eq!(report.backtest.train_len + report.backtest.test_len, 36);
/// ```
pub fn run_pipeline(records: &[SalesRecord], config: &PipelineConfig) -> Result<ForecastReport> {
    config.validate()?;
    let period = config.seasonal_period;

    let series = build_monthly_series(records).map_err(|e| e.at(PipelineStage::Build))?;
    let (train, test) =
        train_test_split(&series, config.train_ratio).map_err(|e| e.at(PipelineStage::Build))?;

    let decomposer = ClassicalDecomposition::multiplicative(period);
    let additive_spec = HoltWinters::additive(period).with_solver_kind(config.solver);
    let multiplicative_spec = HoltWinters::multiplicative(period)
        .with_trend(config.multiplicative_trend)
        .with_solver_kind(config.solver);

    // Join barrier: nothing is inspected until all three have finished.
    let (decomposition, (additive, multiplicative)) = if config.parallel {
        rayon::join(
            || decomposer.decompose(&series),
            || {
                rayon::join(
                    || additive_spec.fit(&series),
                    || multiplicative_spec.fit(&series),
                )
            },
        )
    } else {
        (
            decomposer.decompose(&series),
            (additive_spec.fit(&series), multiplicative_spec.fit(&series)),
        )
    };
    let decomposition = decomposition.map_err(|e| e.at(PipelineStage::Decompose))?;
    let additive = additive.map_err(|e| e.at(PipelineStage::FitAdditive))?;
    let multiplicative = multiplicative.map_err(|e| e.at(PipelineStage::FitMultiplicative))?;

    let predicted = match config.backtest {
        Backtest::InSample => {
            let last = test.end().ok_or_else(|| {
                ForecastError::Validation("test window is empty".to_string())
                    .at(PipelineStage::Build)
            })?;
            multiplicative
                .predict_range(test.start(), last)
                .map_err(|e| e.at(PipelineStage::Forecast))?
        }
        Backtest::Holdout => {
            let model = multiplicative_spec
                .fit(&train)
                .map_err(|e| e.at(PipelineStage::FitMultiplicative))?;
            model
                .forecast(test.len())
                .map_err(|e| e.at(PipelineStage::Forecast))?
                .to_series()
        }
    };
    let metrics = evaluate(&test, &predicted).map_err(|e| e.at(PipelineStage::Evaluate))?;
    debug!(
        mode = ?config.backtest,
        train = train.len(),
        test = test.len(),
        "backtest finished"
    );

    let forecast = match config.interval_level {
        Some(level) => multiplicative.forecast_with_intervals(config.horizon, level),
        None => multiplicative.forecast(config.horizon),
    }
    .map_err(|e| e.at(PipelineStage::Forecast))?;

    info!(
        months = series.len(),
        from = %series.start(),
        horizon = config.horizon,
        mae = metrics.mae,
        rmse = metrics.rmse,
        mape = metrics.mape,
        "pipeline finished"
    );

    Ok(ForecastReport {
        backtest: BacktestReport {
            mode: config.backtest,
            train_len: train.len(),
            test_len: test.len(),
            actual: test,
            predicted,
            metrics,
        },
        series,
        decomposition,
        additive,
        multiplicative,
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_monthly_sales() {
        let config = PipelineConfig::default();
        assert_eq!(config.seasonal_period, 12);
        assert_eq!(config.horizon, 24);
        assert_eq!(config.train_ratio, 0.8);
        assert_eq!(config.backtest, Backtest::InSample);
        assert_eq!(config.solver, SolverKind::NelderMead);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_reads_partial_json() {
        let json = r#"{ "horizon": 12, "backtest": "holdout", "solver": "coordinate-descent" }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.horizon, 12);
        assert_eq!(config.backtest, Backtest::Holdout);
        assert_eq!(config.solver, SolverKind::CoordinateDescent);
        assert_eq!(config.seasonal_period, 12);
        assert_eq!(config.interval_level, Some(0.95));
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let json = r#"{ "horizont": 12 }"#;
        assert!(serde_json::from_str::<PipelineConfig>(json).is_err());
    }

    #[test]
    fn config_validation() {
        let base = PipelineConfig::default();
        assert!(base.clone().with_horizon(0).validate().is_err());
        assert!(base.clone().with_train_ratio(1.0).validate().is_err());
        assert!(base.clone().with_interval_level(Some(0.0)).validate().is_err());
        assert!(base.clone().with_interval_level(None).validate().is_ok());

        let mut bad_period = base;
        bad_period.seasonal_period = 1;
        assert!(matches!(
            bad_period.validate(),
            Err(ForecastError::Validation(_))
        ));
    }

    #[test]
    fn empty_input_fails_in_build_stage() {
        let records = vec![SalesRecord::new(2023, 1, None)];
        let err = run_pipeline(&records, &PipelineConfig::default()).unwrap_err();

        assert_eq!(err.stage(), Some(PipelineStage::Build));
        assert!(matches!(err.root(), ForecastError::Validation(_)));
    }
}
