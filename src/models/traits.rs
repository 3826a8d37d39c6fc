//! Forecaster trait defining the interface of a fitted model.

use crate::core::{Forecast, Period, TimeSeries};
use crate::error::Result;

/// A fitted model that can extrapolate and replay its training window.
///
/// Fitting produces the implementor; it is immutable afterwards, so the
/// same model can be shared across threads and queried repeatedly.
pub trait Forecaster {
    /// Generate point predictions for the `horizon` months after the
    /// training window.
    fn forecast(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with prediction intervals at coverage `level`.
    fn forecast_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        // Default implementation just returns point predictions
        let _ = level;
        self.forecast(horizon)
    }

    /// One-step-ahead in-sample predictions for the inclusive range
    /// `from..=to` of the training index.
    ///
    /// Only the span of [`fitted_values`](Self::fitted_values) can be
    /// replayed. For seasonal models that excludes the first cycle, which
    /// only initializes the state. A range outside that span, or with
    /// `from > to`, is a `Validation` error.
    fn predict_range(&self, from: Period, to: Period) -> Result<TimeSeries>;

    /// In-sample one-step-ahead predictions.
    fn fitted_values(&self) -> &TimeSeries;

    /// Actual minus fitted, aligned with [`fitted_values`](Self::fitted_values).
    fn residuals(&self) -> &[f64];

    /// Get the model name.
    fn name(&self) -> &str;
}
