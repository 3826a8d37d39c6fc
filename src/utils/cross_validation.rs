//! Train/test splitting and time series cross-validation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Period, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::metrics::{mae, mape, rmse};
use crate::utils::stats::{mean, std_dev};

/// Split a series chronologically into training and test parts.
///
/// The training part holds `round(ratio * n)` observations and the test
/// part the rest; together they cover the input exactly once.
///
/// # Errors
/// `Validation` when `ratio` is outside `(0, 1)` or either part would be
/// empty.
pub fn train_test_split(series: &TimeSeries, ratio: f64) -> Result<(TimeSeries, TimeSeries)> {
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(ForecastError::Validation(format!(
            "train ratio must be in (0, 1), got {ratio}"
        )));
    }
    let n = series.len();
    let train_len = (ratio * n as f64).round() as usize;
    if train_len == 0 || train_len >= n {
        return Err(ForecastError::Validation(format!(
            "train ratio {ratio} leaves an empty part for a series of {n} months"
        )));
    }
    Ok((series.slice(0, train_len)?, series.slice(train_len, n)?))
}

/// Cross-validation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CVStrategy {
    /// Rolling window: fixed training window size, slides forward.
    Rolling,
    /// Expanding window: training window grows, starts from initial_window.
    #[default]
    Expanding,
}

/// Configuration for time series cross-validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVConfig {
    /// Forecast horizon for each fold.
    pub horizon: usize,
    /// Initial training window size.
    pub initial_window: usize,
    /// Step size between folds.
    pub step_size: usize,
    pub strategy: CVStrategy,
}

impl Default for CVConfig {
    fn default() -> Self {
        Self {
            horizon: 12,
            initial_window: 24,
            step_size: 1,
            strategy: CVStrategy::Expanding,
        }
    }
}

impl CVConfig {
    /// Create a new CV configuration with expanding window strategy.
    pub fn expanding(initial_window: usize, horizon: usize) -> Self {
        Self {
            initial_window,
            horizon,
            step_size: 1,
            strategy: CVStrategy::Expanding,
        }
    }

    /// Create a new CV configuration with rolling window strategy.
    pub fn rolling(window_size: usize, horizon: usize) -> Self {
        Self {
            initial_window: window_size,
            horizon,
            step_size: 1,
            strategy: CVStrategy::Rolling,
        }
    }

    /// Set the step size between folds.
    pub fn with_step_size(mut self, step_size: usize) -> Self {
        self.step_size = step_size;
        self
    }

    /// Forecast origins, as positions into a series of length `n`.
    fn origins(&self, n: usize) -> Vec<usize> {
        (self.initial_window..)
            .step_by(self.step_size)
            .take_while(|origin| origin + self.horizon <= n)
            .collect()
    }
}

/// Outcome of one fold.
#[derive(Debug, Clone, Serialize)]
pub struct FoldResult {
    /// First forecast period of the fold.
    pub origin: Period,
    pub train_len: usize,
    pub actual: TimeSeries,
    pub predicted: TimeSeries,
    pub mae: f64,
    pub rmse: f64,
    /// `None` when an actual value in the fold is zero.
    pub mape: Option<f64>,
}

/// Aggregated metrics from cross-validation.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedMetrics {
    /// Mean MAE across folds.
    pub mae: f64,
    /// Mean RMSE across folds.
    pub rmse: f64,
    /// Mean MAPE across folds (None if any fold had zeros).
    pub mape: Option<f64>,
    /// Standard deviation of MAE across folds.
    pub mae_std: f64,
    /// Standard deviation of RMSE across folds.
    pub rmse_std: f64,
}

/// Results from cross-validation.
#[derive(Debug, Clone, Serialize)]
pub struct CVResults {
    pub n_folds: usize,
    pub aggregated: AggregatedMetrics,
    pub folds: Vec<FoldResult>,
}

/// Perform time series cross-validation.
///
/// `fit` is called once per fold with that fold's training window; folds
/// run in parallel and are reported in chronological order.
///
/// # Errors
/// - `Validation` for a zero horizon, step size or initial window
/// - `InsufficientHistory` when the series is too short for a single fold
/// - any error returned by `fit` or by the fitted model's forecast
///
/// # Example
/// ```
/// use sales_forecast::core::{Period, TimeSeries};
/// use sales_forecast::models::HoltWinters;
/// use sales_forecast::utils::cross_validation::{cross_validate, CVConfig};
///
/// let values: Vec<f64> = (0..48)
///     .map(|t| 500.0 + 4.0 * t as f64 + 60.0 * ((t % 12) as f64 - 5.5).abs())
///     .collect();
/// let series = TimeSeries::new(Period::new(2020, 1).unwrap(), values);
///
/// let config = CVConfig::expanding(36, 6).with_step_size(3);
/// let spec = HoltWinters::additive(12);
/// let results = cross_validate(&config, &series, |train| spec.fit(train)).unwrap();
///
/// assert_eq!(results.n_folds, 3);
/// assert!(results.aggregated.rmse >= results.aggregated.mae);
/// ```
pub fn cross_validate<M, F>(config: &CVConfig, series: &TimeSeries, fit: F) -> Result<CVResults>
where
    M: Forecaster,
    F: Fn(&TimeSeries) -> Result<M> + Sync,
{
    if config.horizon == 0 || config.step_size == 0 || config.initial_window == 0 {
        return Err(ForecastError::Validation(
            "horizon, step size and initial window must be positive".to_string(),
        ));
    }

    let n = series.len();
    let origins = config.origins(n);
    if origins.is_empty() {
        return Err(ForecastError::InsufficientHistory {
            needed: config.initial_window + config.horizon,
            got: n,
        });
    }

    let folds = origins
        .into_par_iter()
        .map(|origin| run_fold(config, series, origin, &fit))
        .collect::<Result<Vec<_>>>()?;

    let n_folds = folds.len();
    let mae_values: Vec<f64> = folds.iter().map(|f| f.mae).collect();
    let rmse_values: Vec<f64> = folds.iter().map(|f| f.rmse).collect();

    // MAPE is only valid if all folds have it
    let mape = folds
        .iter()
        .map(|f| f.mape)
        .collect::<Option<Vec<f64>>>()
        .map(|values| mean(&values));

    let aggregated = AggregatedMetrics {
        mae: mean(&mae_values),
        rmse: mean(&rmse_values),
        mape,
        mae_std: if n_folds > 1 { std_dev(&mae_values) } else { 0.0 },
        rmse_std: if n_folds > 1 { std_dev(&rmse_values) } else { 0.0 },
    };
    debug!(
        n_folds,
        mae = aggregated.mae,
        rmse = aggregated.rmse,
        "cross-validation finished"
    );

    Ok(CVResults {
        n_folds,
        aggregated,
        folds,
    })
}

fn run_fold<M, F>(config: &CVConfig, series: &TimeSeries, origin: usize, fit: &F) -> Result<FoldResult>
where
    M: Forecaster,
    F: Fn(&TimeSeries) -> Result<M>,
{
    let train_start = match config.strategy {
        CVStrategy::Rolling => origin.saturating_sub(config.initial_window),
        CVStrategy::Expanding => 0,
    };
    let train = series.slice(train_start, origin)?;
    let actual = series.slice(origin, origin + config.horizon)?;

    let model = fit(&train)?;
    let predicted = model.forecast(config.horizon)?.to_series();

    Ok(FoldResult {
        origin: actual.start(),
        train_len: train.len(),
        mae: mae(actual.values(), predicted.values())?,
        rmse: rmse(actual.values(), predicted.values())?,
        mape: mape(actual.values(), predicted.values()).ok(),
        actual,
        predicted,
    })
}
