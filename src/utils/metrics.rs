//! Accuracy metrics for forecast evaluation.

use serde::{Deserialize, Serialize};

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Out-of-sample accuracy of a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, as a fraction (0.05 = 5%)
    pub mape: f64,
}

/// Compare aligned actual and predicted series.
///
/// # Errors
/// - `Alignment` when the two series do not cover the same periods
/// - `Validation` when the series are empty or contain non-finite values
/// - `UndefinedMetric` when an actual value is zero (MAPE undefined)
pub fn evaluate(actual: &TimeSeries, predicted: &TimeSeries) -> Result<EvaluationMetrics> {
    if !actual.same_index(predicted) {
        return Err(ForecastError::Alignment(format!(
            "actual covers {} months from {}, predicted covers {} months from {}",
            actual.len(),
            actual.start(),
            predicted.len(),
            predicted.start()
        )));
    }
    calculate_metrics(actual.values(), predicted.values())
}

/// Calculate MAE, RMSE and MAPE between two equally long slices.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<EvaluationMetrics> {
    check_pair(actual, predicted)?;
    Ok(EvaluationMetrics {
        mae: mae(actual, predicted)?,
        rmse: rmse(actual, predicted)?,
        mape: mape(actual, predicted)?,
    })
}

fn check_pair(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::Alignment(format!(
            "expected {} predictions, got {}",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(ForecastError::Validation(
            "cannot evaluate an empty series".to_string(),
        ));
    }
    if actual.iter().chain(predicted).any(|v| !v.is_finite()) {
        return Err(ForecastError::Validation(
            "cannot evaluate non-finite values".to_string(),
        ));
    }
    Ok(())
}

/// Mean absolute error.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let n = actual.len() as f64;
    Ok(actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n)
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let n = actual.len() as f64;
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;
    Ok(mse.sqrt())
}

/// Mean absolute percentage error, as a fraction.
///
/// Undefined when any actual value is zero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    if let Some(i) = actual.iter().position(|&a| a == 0.0) {
        return Err(ForecastError::UndefinedMetric(format!(
            "MAPE is undefined: actual value at position {i} is zero"
        )));
    }
    let n = actual.len() as f64;
    Ok(actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / a).abs())
        .sum::<f64>()
        / n)
}
