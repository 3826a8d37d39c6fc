//! Regular monthly time series.

use serde::{Deserialize, Serialize};

use crate::core::Period;
use crate::error::{ForecastError, Result};

/// A monthly series on a contiguous calendar.
///
/// The index is implied by `start` and the number of values: entry `i`
/// belongs to `start.offset(i)`. There are no gaps and no duplicate periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    start: Period,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series whose first entry falls on `start`.
    pub fn new(start: Period, values: Vec<f64>) -> Self {
        Self { start, values }
    }

    /// Create a series from explicit `(period, value)` pairs.
    ///
    /// The periods must be strictly increasing and consecutive.
    pub fn from_points(points: Vec<(Period, f64)>) -> Result<Self> {
        let start = match points.first() {
            Some((p, _)) => *p,
            None => {
                return Err(ForecastError::Validation(
                    "cannot build a series from zero points".to_string(),
                ))
            }
        };

        for pair in points.windows(2) {
            let (prev, next) = (pair[0].0, pair[1].0);
            if prev.months_until(next) != 1 {
                return Err(ForecastError::Validation(format!(
                    "periods must be consecutive months, found {prev} followed by {next}"
                )));
            }
        }

        Ok(Self {
            start,
            values: points.into_iter().map(|(_, v)| v).collect(),
        })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First period of the index.
    pub fn start(&self) -> Period {
        self.start
    }

    /// Last period of the index, `None` when empty.
    pub fn end(&self) -> Option<Period> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.period_at(self.values.len() - 1))
        }
    }

    /// Period of the entry at `index`.
    pub fn period_at(&self, index: usize) -> Period {
        self.start.offset(index as i64)
    }

    /// Position of `period` in the index.
    pub fn index_of(&self, period: Period) -> Option<usize> {
        let offset = self.start.months_until(period);
        if offset >= 0 && (offset as usize) < self.values.len() {
            Some(offset as usize)
        } else {
            None
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value recorded for `period`.
    pub fn value_at(&self, period: Period) -> Option<f64> {
        self.index_of(period).map(|i| self.values[i])
    }

    /// Iterate over the period index.
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        (0..self.values.len()).map(move |i| self.period_at(i))
    }

    /// Iterate over `(period, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (self.period_at(i), v))
    }

    /// Extract entries `start..end` by position.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::Validation(
                "slice start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::Validation(format!(
                "slice end {end} exceeds series length {}",
                self.len()
            )));
        }
        Ok(TimeSeries {
            start: self.period_at(start),
            values: self.values[start..end].to_vec(),
        })
    }

    /// Extract the inclusive period range `from..=to`.
    pub fn slice_periods(&self, from: Period, to: Period) -> Result<TimeSeries> {
        let (start, end) = match (self.index_of(from), self.index_of(to)) {
            (Some(s), Some(e)) if s <= e => (s, e + 1),
            _ => {
                return Err(ForecastError::Validation(format!(
                    "range {from}..={to} is not inside the series index"
                )))
            }
        };
        self.slice(start, end)
    }

    /// Whether both series cover exactly the same periods.
    pub fn same_index(&self, other: &TimeSeries) -> bool {
        self.len() == other.len() && (self.is_empty() || self.start == other.start)
    }

    /// Whether any value is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Arithmetic mean of the values, NaN when empty.
    pub fn mean(&self) -> f64 {
        crate::utils::stats::mean(&self.values)
    }
}
