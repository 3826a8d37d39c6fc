//! Utility functions for forecasting models.

pub mod cross_validation;
pub mod metrics;
pub mod optimization;
pub mod stats;

pub use cross_validation::{cross_validate, train_test_split, CVConfig, CVResults, CVStrategy};
pub use metrics::{calculate_metrics, evaluate, EvaluationMetrics};
pub use optimization::{
    CoordinateDescent, CoordinateDescentConfig, NelderMead, NelderMeadConfig, Solution, Solver,
    SolverKind,
};
pub use stats::quantile_normal;
