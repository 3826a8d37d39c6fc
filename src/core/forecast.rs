//! Forecast result structure for holding predictions.

use serde::Serialize;

use crate::core::{Period, TimeSeries};
use crate::error::{ForecastError, Result};

/// Point predictions for the periods following a training window, with
/// optional prediction intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// First forecast period.
    start: Period,
    /// Point predictions, one per step.
    point: Vec<f64>,
    /// Lower prediction interval bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    lower: Option<Vec<f64>>,
    /// Upper prediction interval bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    upper: Option<Vec<f64>>,
    /// Nominal coverage of the intervals.
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<f64>,
}

impl Forecast {
    /// Create a forecast from point predictions starting at `start`.
    pub fn from_values(start: Period, values: Vec<f64>) -> Self {
        Self {
            start,
            point: values,
            lower: None,
            upper: None,
            level: None,
        }
    }

    /// Create a forecast with prediction intervals at coverage `level`.
    pub fn from_values_with_intervals(
        start: Period,
        values: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
        level: f64,
    ) -> Result<Self> {
        if lower.len() != values.len() || upper.len() != values.len() {
            return Err(ForecastError::Alignment(format!(
                "interval bounds have lengths {}/{} for {} predictions",
                lower.len(),
                upper.len(),
                values.len()
            )));
        }
        Ok(Self {
            start,
            point: values,
            lower: Some(lower),
            upper: Some(upper),
            level: Some(level),
        })
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// First forecast period.
    pub fn start(&self) -> Period {
        self.start
    }

    /// Forecast periods in order.
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        (0..self.point.len()).map(move |i| self.start.offset(i as i64))
    }

    /// Point predictions.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Point predictions as a monthly series.
    pub fn to_series(&self) -> TimeSeries {
        TimeSeries::new(self.start, self.point.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_periods_continue_from_start() {
        let start = Period::new(2023, 11).unwrap();
        let forecast = Forecast::from_values(start, vec![1.0, 2.0, 3.0]);

        assert_eq!(forecast.horizon(), 3);
        assert!(!forecast.has_intervals());
        let periods: Vec<String> = forecast.periods().map(|p| p.to_string()).collect();
        assert_eq!(periods, vec!["2023-11", "2023-12", "2024-01"]);
        assert_eq!(forecast.to_series().end(), Period::new(2024, 1).ok());
    }

    #[test]
    fn forecast_with_intervals_checks_lengths() {
        let start = Period::new(2023, 1).unwrap();
        let forecast = Forecast::from_values_with_intervals(
            start,
            vec![2.0, 3.0],
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            0.95,
        )
        .unwrap();

        assert!(forecast.has_intervals());
        assert_eq!(forecast.lower().unwrap(), &[1.0, 2.0]);
        assert_eq!(forecast.upper().unwrap(), &[3.0, 4.0]);
        assert_eq!(forecast.level(), Some(0.95));

        let bad =
            Forecast::from_values_with_intervals(start, vec![2.0, 3.0], vec![1.0], vec![3.0], 0.9);
        assert!(matches!(bad, Err(ForecastError::Alignment(_))));
    }

    #[test]
    fn forecast_empty_state() {
        let forecast = Forecast::from_values(Period::new(2023, 1).unwrap(), vec![]);
        assert!(forecast.is_empty());
        assert_eq!(forecast.horizon(), 0);
    }
}
