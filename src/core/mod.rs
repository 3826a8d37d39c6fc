//! Core data structures for monthly sales forecasting.

mod component;
mod forecast;
mod period;
mod record;
mod time_series;

pub use component::ComponentType;
pub use forecast::Forecast;
pub use period::{Period, MAX_YEAR, MIN_YEAR};
pub use record::SalesRecord;
pub use time_series::TimeSeries;
