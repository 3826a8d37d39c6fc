//! # sales-forecast
//!
//! Monthly sales forecasting with Holt-Winters exponential smoothing.
//!
//! Raw sales rows are aggregated into a calendar-complete monthly series,
//! decomposed into trend, season and residual, fitted with additive and
//! multiplicative triple exponential smoothing, extrapolated, and scored
//! on the most recent months with MAE, RMSE and MAPE.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod seasonality;
pub mod utils;

pub use error::{ForecastError, PipelineStage, Result};

pub mod prelude {
    pub use crate::core::{Forecast, Period, SalesRecord, TimeSeries};
    pub use crate::error::{ForecastError, PipelineStage, Result};
    pub use crate::ingest::{build_monthly_series, read_records};
    pub use crate::models::{Forecaster, HoltWinters, SmoothingModel};
    pub use crate::pipeline::{run_pipeline, Backtest, ForecastReport, PipelineConfig};
    pub use crate::seasonality::ClassicalDecomposition;
    pub use crate::utils::{calculate_metrics, evaluate, EvaluationMetrics};
}
