//! Cleaning and monthly aggregation of raw sales records.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::core::{Period, SalesRecord, TimeSeries};
use crate::error::{ForecastError, Result};

/// Build a contiguous monthly series from raw records.
///
/// Records without an amount (or with a NaN amount) are discarded. Amounts
/// falling on the same month are summed, and every month between the first
/// and last observed month that has no surviving record is filled with zero.
/// Records need not be sorted.
///
/// # Errors
/// `Validation` when no record survives null-filtering, when a surviving
/// record has an out-of-range year or month, or when an amount is infinite.
///
/// # Example
/// ```
/// use sales_forecast::core::SalesRecord;
/// use sales_forecast::ingest::build_monthly_series;
///
/// let records = vec![
///     SalesRecord::new(2023, 3, Some(5.0)),
///     SalesRecord::new(2023, 1, Some(2.0)),
///     SalesRecord::new(2023, 1, Some(3.0)),
///     SalesRecord::new(2023, 2, None),
/// ];
/// let series = build_monthly_series(&records).unwrap();
/// assert_eq!(series.values(), &[5.0, 0.0, 5.0]);
/// ```
pub fn build_monthly_series(records: &[SalesRecord]) -> Result<TimeSeries> {
    let mut totals: BTreeMap<Period, f64> = BTreeMap::new();
    let mut kept = 0usize;

    for record in records {
        let amount = match record.amount {
            Some(a) if !a.is_nan() => a,
            _ => continue,
        };
        if !amount.is_finite() {
            return Err(ForecastError::Validation(format!(
                "non-finite amount for {}-{}",
                record.year, record.month
            )));
        }
        let period = record.period()?;
        *totals.entry(period).or_insert(0.0) += amount;
        kept += 1;
    }

    let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(ForecastError::Validation(
                "no records with a sales amount".to_string(),
            ))
        }
    };

    let span = first.months_until(last) as usize + 1;
    let mut values = vec![0.0; span];
    for (period, total) in &totals {
        values[first.months_until(*period) as usize] = *total;
    }

    let filled = span - totals.len();
    if filled > 0 {
        warn!(
            filled,
            from = %first,
            to = %last,
            "months without records were filled with zero sales"
        );
    }
    debug!(
        records = records.len(),
        kept,
        months = span,
        "aggregated sales records"
    );

    Ok(TimeSeries::new(first, values))
}
