//! Error types for the sales-forecast library.

use std::fmt;

use thiserror::Error;

/// Result type alias for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Cleaning and aggregating raw records.
    Build,
    /// Classical seasonal decomposition.
    Decompose,
    /// Additive Holt-Winters fit.
    FitAdditive,
    /// Multiplicative Holt-Winters fit.
    FitMultiplicative,
    /// Extrapolation and in-sample replay.
    Forecast,
    /// Accuracy metrics.
    Evaluate,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Build => "build",
            PipelineStage::Decompose => "decompose",
            PipelineStage::FitAdditive => "fit-additive",
            PipelineStage::FitMultiplicative => "fit-multiplicative",
            PipelineStage::Forecast => "forecast",
            PipelineStage::Evaluate => "evaluate",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building, fitting or evaluating a forecast.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Malformed or empty input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Too little history for a seasonal operation.
    #[error("insufficient history: need at least {needed} observations, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// Numerical fitting failed or the input violates the model's preconditions.
    #[error("fit error: {0}")]
    Fit(String),

    /// Actual and predicted series do not share the same period index.
    #[error("alignment error: {0}")]
    Alignment(String),

    /// A metric is undefined for the given input (e.g. MAPE with zero actuals).
    #[error("undefined metric: {0}")]
    UndefinedMetric(String),

    /// Tabular input could not be read.
    #[error("ingest error: {0}")]
    Ingest(String),

    /// A failure annotated with the pipeline stage it came from.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: PipelineStage,
        source: Box<ForecastError>,
    },
}

impl ForecastError {
    /// Annotate this error with the pipeline stage that produced it.
    pub fn at(self, stage: PipelineStage) -> Self {
        ForecastError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage this error was annotated with, if any.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            ForecastError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying error with any stage annotation stripped.
    pub fn root(&self) -> &ForecastError {
        match self {
            ForecastError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}
