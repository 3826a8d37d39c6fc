//! Forecasting models.

mod holt_winters;
mod traits;

pub use holt_winters::{HoltWinters, InitialState, SmoothingModel, SmoothingParams};
pub use traits::Forecaster;
