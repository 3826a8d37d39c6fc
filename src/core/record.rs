//! Raw sales rows as supplied by the data source.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::Period;
use crate::error::Result;

/// One raw sales row.
///
/// Field names follow the tabular input: `Year`, `Month`, `Sales Amt`.
/// A missing amount is kept as `None` and discarded during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Sales Amt")]
    pub amount: Option<f64>,
}

impl SalesRecord {
    pub fn new(year: i32, month: u32, amount: Option<f64>) -> Self {
        Self {
            year,
            month,
            amount,
        }
    }

    /// Record for the month containing `date`.
    pub fn on_date(date: NaiveDate, amount: Option<f64>) -> Self {
        Self::new(date.year(), date.month(), amount)
    }

    /// The calendar month this record belongs to.
    pub fn period(&self) -> Result<Period> {
        Period::new(self.year, self.month)
    }
}
