//! Classical seasonal decomposition by centered moving averages.
//!
//! Splits a series into:
//! - Trend: centered moving average over one seasonal cycle
//! - Seasonal: per-position average of the detrended series, repeated
//! - Residual: what is left after removing trend and season

use serde::Serialize;
use tracing::debug;

use crate::core::{ComponentType, Period, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::utils::stats::{mean, variance};

/// Result of a classical decomposition.
///
/// All component vectors share the input's index. Trend and residual are
/// `None` at the first and last `period / 2` entries, where the centered
/// moving average is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionResult {
    pub model: ComponentType,
    pub period: usize,
    pub start: Period,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
    /// One index per position `i mod period`, counted from `start`.
    pub seasonal_indices: Vec<f64>,
}

impl DecompositionResult {
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Seasonal component as a series on the input's index.
    pub fn seasonal_series(&self) -> TimeSeries {
        TimeSeries::new(self.start, self.seasonal.clone())
    }

    /// Recombine the components at position `i`, where the trend is defined.
    pub fn reconstruct(&self, i: usize) -> Option<f64> {
        let trend = (*self.trend.get(i)?)?;
        let residual = (*self.residual.get(i)?)?;
        let seasonal = *self.seasonal.get(i)?;
        Some(self.model.combine(self.model.combine(trend, seasonal), residual))
    }

    /// Get the seasonal strength (0 to 1).
    /// Values close to 1 indicate strong seasonality.
    pub fn seasonal_strength(&self) -> f64 {
        let (with_component, remainder): (Vec<f64>, Vec<f64>) = self
            .defined()
            .map(|(_, s, r)| (self.to_additive_scale(s) + r, r))
            .unzip();
        strength(&remainder, &with_component)
    }

    /// Get the trend strength (0 to 1).
    /// Values close to 1 indicate strong trend.
    pub fn trend_strength(&self) -> f64 {
        let (with_component, remainder): (Vec<f64>, Vec<f64>) = self
            .defined()
            .map(|(t, _, r)| (self.to_additive_scale(t) + r, r))
            .unzip();
        strength(&remainder, &with_component)
    }

    /// `(trend, seasonal, residual)` wherever the trend is defined, with the
    /// residual already on the additive scale.
    fn defined(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.trend
            .iter()
            .zip(&self.seasonal)
            .zip(&self.residual)
            .filter_map(move |((t, s), r)| match (t, r) {
                (Some(t), Some(r)) => Some((*t, *s, self.to_additive_scale(*r))),
                _ => None,
            })
    }

    // Multiplicative components are compared on the log scale.
    fn to_additive_scale(&self, value: f64) -> f64 {
        match self.model {
            ComponentType::Additive => value,
            ComponentType::Multiplicative => value.ln(),
        }
    }
}

fn strength(remainder: &[f64], with_component: &[f64]) -> f64 {
    let var_remainder = variance(remainder);
    let var_total = variance(with_component);
    if !(var_total > 1e-10) || !var_remainder.is_finite() {
        return 0.0;
    }
    (1.0 - var_remainder / var_total).clamp(0.0, 1.0)
}

/// Classical decomposition configuration.
///
/// # Example
/// ```
/// use sales_forecast::core::{Period, TimeSeries};
/// use sales_forecast::seasonality::ClassicalDecomposition;
///
/// let values: Vec<f64> = (0..36)
///     .map(|t| (100.0 + t as f64) * if t % 12 == 6 { 1.5 } else { 1.0 })
///     .collect();
/// let series = TimeSeries::new(Period::new(2021, 1).unwrap(), values);
///
/// let result = ClassicalDecomposition::multiplicative(12).decompose(&series).unwrap();
/// assert!(result.trend[0].is_none());
/// assert!(result.trend[6].is_some());
/// assert!(result.seasonal_indices[6] > 1.2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassicalDecomposition {
    period: usize,
    model: ComponentType,
}

impl ClassicalDecomposition {
    pub fn new(period: usize, model: ComponentType) -> Self {
        Self { period, model }
    }

    /// Seasonal component scales the trend.
    pub fn multiplicative(period: usize) -> Self {
        Self::new(period, ComponentType::Multiplicative)
    }

    /// Seasonal component is added to the trend.
    pub fn additive(period: usize) -> Self {
        Self::new(period, ComponentType::Additive)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn model(&self) -> ComponentType {
        self.model
    }

    /// Decompose `series`.
    ///
    /// # Errors
    /// - `Validation` for a period below 2, non-finite values, or values
    ///   `<= 0` in multiplicative mode
    /// - `InsufficientHistory` when the series covers fewer than two cycles
    pub fn decompose(&self, series: &TimeSeries) -> Result<DecompositionResult> {
        let period = self.period;
        let values = series.values();
        let n = values.len();

        if period < 2 {
            return Err(ForecastError::Validation(format!(
                "seasonal period must be at least 2, got {period}"
            )));
        }
        if n < 2 * period {
            return Err(ForecastError::InsufficientHistory {
                needed: 2 * period,
                got: n,
            });
        }
        if series.has_non_finite() {
            return Err(ForecastError::Validation(
                "series contains non-finite values".to_string(),
            ));
        }
        if self.model == ComponentType::Multiplicative {
            if let Some((p, v)) = series.iter().find(|(_, v)| *v <= 0.0) {
                return Err(ForecastError::Validation(format!(
                    "multiplicative decomposition requires positive values, found {v} at {p}"
                )));
            }
        }

        let trend = centered_moving_average(values, period);

        // Average the detrended values sharing a position in the cycle
        let mut sums = vec![0.0; period];
        let mut counts = vec![0usize; period];
        for (i, (y, t)) in values.iter().zip(&trend).enumerate() {
            if let Some(t) = t {
                sums[i % period] += self.model.remove(*y, *t);
                counts[i % period] += 1;
            }
        }
        let mut seasonal_indices: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &c)| s / c as f64)
            .collect();

        let m = mean(&seasonal_indices);
        for s in seasonal_indices.iter_mut() {
            match self.model {
                ComponentType::Additive => *s -= m,
                ComponentType::Multiplicative => *s /= m,
            }
        }

        let seasonal: Vec<f64> = (0..n).map(|i| seasonal_indices[i % period]).collect();
        let residual: Vec<Option<f64>> = values
            .iter()
            .zip(&trend)
            .zip(&seasonal)
            .map(|((y, t), s)| t.map(|t| self.model.remove(*y, self.model.combine(t, *s))))
            .collect();

        debug!(
            model = %self.model,
            period,
            n,
            "classical decomposition finished"
        );

        Ok(DecompositionResult {
            model: self.model,
            period,
            start: series.start(),
            observed: values.to_vec(),
            trend,
            seasonal,
            residual,
            seasonal_indices,
        })
    }
}

impl Default for ClassicalDecomposition {
    fn default() -> Self {
        Self::multiplicative(12)
    }
}

/// Centered moving average over one cycle.
///
/// Even periods use a `period + 1` window with half weight on both ends.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let even = period % 2 == 0;

    (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return None;
            }
            let window = &values[i - half..=i + half];
            let sum: f64 = if even {
                let inner: f64 = window[1..window.len() - 1].iter().sum();
                inner + 0.5 * (window[0] + window[window.len() - 1])
            } else {
                window.iter().sum()
            };
            Some(sum / period as f64)
        })
        .collect()
}
