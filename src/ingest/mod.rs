//! Turning raw tabular sales data into a monthly series.
//!
//! - [`read_records`]: parse CSV rows into [`SalesRecord`](crate::core::SalesRecord)s
//! - [`build_monthly_series`]: clean, aggregate and calendar-fill the records

mod aggregate;
mod reader;

pub use self::aggregate::build_monthly_series;
pub use self::reader::{read_records, read_records_from_path, REQUIRED_COLUMNS};
