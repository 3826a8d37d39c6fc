//! Holt-Winters forecasting model.
//!
//! Also known as triple exponential smoothing, this model handles
//! data with both trend and seasonality. [`HoltWinters`] holds the model
//! definition and estimates the smoothing parameters; fitting returns an
//! immutable [`SmoothingModel`] that does the forecasting.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ComponentType, Forecast, Period, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{NelderMead, Solver, SolverKind};
use crate::utils::stats::{mean, quantile_normal};

const PARAM_BOUNDS: [(f64, f64); 3] = [(0.0, 1.0); 3];

/// Smoothing coefficients for level, trend and season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl SmoothingParams {
    /// Create parameters, each of which must lie in `[0, 1]`.
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ForecastError::Validation(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(Self { alpha, beta, gamma })
    }

    fn from_slice(point: &[f64]) -> Self {
        Self {
            alpha: point[0].clamp(0.0, 1.0),
            beta: point[1].clamp(0.0, 1.0),
            gamma: point[2].clamp(0.0, 1.0),
        }
    }
}

/// State the recurrence starts from, estimated from the first cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitialState {
    pub level: f64,
    pub trend: f64,
    pub seasonals: Vec<f64>,
}

/// Holt-Winters model definition and parameter estimator.
///
/// The model equations for additive trend and seasonality:
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + h*b_t + s_{t+h-m}`
///
/// For multiplicative seasonality:
/// - Level: `l_t = α(y_t / s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t / l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = (l_t + h*b_t) * s_{t+h-m}`
///
/// A multiplicative trend replaces `l + b` with `l * b`, `l_t - l_{t-1}`
/// with `l_t / l_{t-1}` and `l + h*b` with `l * b^h`.
///
/// The first seasonal cycle initializes the state, so in-sample
/// predictions start at the second cycle.
///
/// # Example
/// ```
/// use sales_forecast::core::{Period, TimeSeries};
/// use sales_forecast::models::{Forecaster, HoltWinters};
///
/// let values: Vec<f64> = (0..36)
///     .map(|t| 100.0 + t as f64 + 10.0 * ((t % 12) as f64 - 5.5).abs())
///     .collect();
/// let series = TimeSeries::new(Period::new(2021, 1).unwrap(), values);
///
/// let model = HoltWinters::multiplicative(12).fit(&series).unwrap();
/// let forecast = model.forecast(6).unwrap();
///
/// assert_eq!(forecast.horizon(), 6);
/// assert_eq!(forecast.start(), Period::new(2024, 1).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct HoltWinters {
    /// Seasonal period.
    seasonal_period: usize,
    /// How the trend combines with the level.
    trend_type: ComponentType,
    /// How the season combines with level and trend.
    seasonal_type: ComponentType,
    /// Fixed parameters; estimated when `None`.
    params: Option<SmoothingParams>,
    /// Minimizer used for parameter estimation.
    solver: Arc<dyn Solver>,
}

impl HoltWinters {
    /// Create a model definition whose parameters are estimated by fitting.
    pub fn new(
        seasonal_period: usize,
        trend_type: ComponentType,
        seasonal_type: ComponentType,
    ) -> Self {
        Self {
            seasonal_period,
            trend_type,
            seasonal_type,
            params: None,
            solver: Arc::new(NelderMead::default()),
        }
    }

    /// Additive trend and additive seasonality.
    pub fn additive(seasonal_period: usize) -> Self {
        Self::new(
            seasonal_period,
            ComponentType::Additive,
            ComponentType::Additive,
        )
    }

    /// Additive trend and multiplicative seasonality.
    pub fn multiplicative(seasonal_period: usize) -> Self {
        Self::new(
            seasonal_period,
            ComponentType::Additive,
            ComponentType::Multiplicative,
        )
    }

    /// Use fixed smoothing parameters instead of estimating them.
    pub fn with_params(mut self, params: SmoothingParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Change how the trend combines with the level.
    pub fn with_trend(mut self, trend_type: ComponentType) -> Self {
        self.trend_type = trend_type;
        self
    }

    /// Use a different minimizer for parameter estimation.
    pub fn with_solver<S: Solver + 'static>(mut self, solver: S) -> Self {
        self.solver = Arc::new(solver);
        self
    }

    /// Use one of the built-in minimizers.
    pub fn with_solver_kind(mut self, kind: SolverKind) -> Self {
        self.solver = Arc::from(kind.build());
        self
    }

    /// Get the seasonal period.
    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    pub fn trend_type(&self) -> ComponentType {
        self.trend_type
    }

    pub fn seasonal_type(&self) -> ComponentType {
        self.seasonal_type
    }

    /// Fit the model to `series`.
    ///
    /// # Errors
    /// - `Validation` for a seasonal period below 2
    /// - `Fit` when the series is shorter than two seasonal cycles, contains
    ///   non-finite values, contains values `<= 0` while a component is
    ///   multiplicative, when the solver does not converge, or when the
    ///   recurrence produces a non-finite state
    pub fn fit(&self, series: &TimeSeries) -> Result<SmoothingModel> {
        let values = series.values();
        self.validate(series)?;

        let period = self.seasonal_period;
        let initial = initial_state(values, period, self.trend_type, self.seasonal_type);
        if !(initial.level.is_finite()
            && initial.trend.is_finite()
            && initial.seasonals.iter().all(|s| s.is_finite()))
        {
            return Err(ForecastError::Fit(
                "initial state is not finite".to_string(),
            ));
        }

        let params = match self.params {
            Some(params) => params,
            None => self.optimize_params(values, &initial)?,
        };

        let run = smooth(
            values,
            &initial,
            params,
            period,
            self.trend_type,
            self.seasonal_type,
        )?;

        let residuals: Vec<f64> = values[period..]
            .iter()
            .zip(&run.fitted)
            .map(|(y, f)| y - f)
            .collect();
        let residual_variance =
            residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;

        debug!(
            trend = %self.trend_type,
            seasonal = %self.seasonal_type,
            alpha = params.alpha,
            beta = params.beta,
            gamma = params.gamma,
            sse = run.sse,
            "fitted Holt-Winters model"
        );

        Ok(SmoothingModel {
            params,
            trend_type: self.trend_type,
            seasonal_type: self.seasonal_type,
            seasonal_period: period,
            initial,
            level: run.level,
            trend: run.trend,
            seasonals: run.seasonals,
            fitted: TimeSeries::new(series.period_at(period), run.fitted),
            residuals,
            sse: run.sse,
            residual_variance,
            training_start: series.start(),
            training_len: values.len(),
        })
    }

    /// Check every precondition before any numerical work.
    fn validate(&self, series: &TimeSeries) -> Result<()> {
        let period = self.seasonal_period;
        if period < 2 {
            return Err(ForecastError::Validation(format!(
                "seasonal period must be at least 2, got {period}"
            )));
        }
        if series.len() < 2 * period {
            return Err(ForecastError::Fit(format!(
                "need at least {} observations for seasonal period {period}, got {}",
                2 * period,
                series.len()
            )));
        }
        if series.has_non_finite() {
            return Err(ForecastError::Fit(
                "series contains non-finite values".to_string(),
            ));
        }
        let multiplicative = self.trend_type == ComponentType::Multiplicative
            || self.seasonal_type == ComponentType::Multiplicative;
        if multiplicative {
            if let Some((p, v)) = series.iter().find(|(_, v)| *v <= 0.0) {
                return Err(ForecastError::Fit(format!(
                    "multiplicative model requires positive values, found {v} at {p}"
                )));
            }
        }
        Ok(())
    }

    /// Minimize the one-step-ahead SSE over `[0, 1]^3`.
    fn optimize_params(&self, values: &[f64], initial: &InitialState) -> Result<SmoothingParams> {
        let period = self.seasonal_period;
        let (trend_type, seasonal_type) = (self.trend_type, self.seasonal_type);

        let objective = |point: &[f64]| {
            smooth(
                values,
                initial,
                SmoothingParams::from_slice(point),
                period,
                trend_type,
                seasonal_type,
            )
            .map(|run| run.sse)
            .unwrap_or(f64::INFINITY)
        };

        let solution = self.solver.minimize(&objective, &PARAM_BOUNDS);
        debug!(
            solver = self.solver.name(),
            iterations = solution.iterations,
            converged = solution.converged,
            sse = solution.value,
            "smoothing parameter search finished"
        );

        if !solution.value.is_finite() {
            return Err(ForecastError::Fit(
                "no smoothing parameters give a finite fit".to_string(),
            ));
        }
        if !solution.converged {
            return Err(ForecastError::Fit(format!(
                "{} did not converge after {} iterations",
                self.solver.name(),
                solution.iterations
            )));
        }
        Ok(SmoothingParams::from_slice(&solution.point))
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::multiplicative(12)
    }
}

/// Initialize state from the first two seasonal cycles.
fn initial_state(
    values: &[f64],
    period: usize,
    trend_type: ComponentType,
    seasonal_type: ComponentType,
) -> InitialState {
    // Initial level: average of first season
    let first_season = &values[..period];
    let level = mean(first_season);

    let trend = match trend_type {
        // Average seasonal difference, per step
        ComponentType::Additive => {
            let sum: f64 = (0..period)
                .map(|i| (values[period + i] - values[i]) / period as f64)
                .sum();
            sum / period as f64
        }
        // Per-step growth factor between the first two season means
        ComponentType::Multiplicative => {
            let second = mean(&values[period..2 * period]);
            (second / level).powf(1.0 / period as f64)
        }
    };

    let mut seasonals: Vec<f64> = first_season
        .iter()
        .map(|&y| seasonal_type.remove(y, level))
        .collect();
    normalize_seasonals(&mut seasonals, seasonal_type);

    InitialState {
        level,
        trend,
        seasonals,
    }
}

/// Additive: seasonals sum to 0. Multiplicative: seasonals average to 1.
fn normalize_seasonals(seasonals: &mut [f64], seasonal_type: ComponentType) {
    let m = mean(seasonals);
    match seasonal_type {
        ComponentType::Additive => {
            for s in seasonals.iter_mut() {
                *s -= m;
            }
        }
        ComponentType::Multiplicative => {
            if m.abs() > 1e-10 {
                for s in seasonals.iter_mut() {
                    *s /= m;
                }
            }
        }
    }
}

/// Output of one pass of the recurrence.
struct Smoothed {
    fitted: Vec<f64>,
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    sse: f64,
}

/// Run the recurrence over `values[period..]`.
fn smooth(
    values: &[f64],
    initial: &InitialState,
    params: SmoothingParams,
    period: usize,
    trend_type: ComponentType,
    seasonal_type: ComponentType,
) -> Result<Smoothed> {
    let SmoothingParams { alpha, beta, gamma } = params;
    let mut level = initial.level;
    let mut trend = initial.trend;
    let mut seasonals = initial.seasonals.clone();
    let mut fitted = Vec::with_capacity(values.len().saturating_sub(period));
    let mut sse = 0.0;

    for (t, &y) in values.iter().enumerate().skip(period) {
        let season_idx = t % period;
        let s = seasonals[season_idx];

        let base = trend_type.combine(level, trend);
        let forecast = seasonal_type.combine(base, s);

        let level_prev = level;
        level = alpha * seasonal_type.remove(y, s) + (1.0 - alpha) * base;
        trend = beta * trend_type.remove(level, level_prev) + (1.0 - beta) * trend;
        let s_new = gamma * seasonal_type.remove(y, level) + (1.0 - gamma) * s;

        if !(forecast.is_finite() && level.is_finite() && trend.is_finite() && s_new.is_finite())
        {
            return Err(ForecastError::Fit(format!(
                "recurrence produced a non-finite state at step {t}"
            )));
        }

        seasonals[season_idx] = s_new;
        let error = y - forecast;
        sse += error * error;
        fitted.push(forecast);
    }

    if !sse.is_finite() {
        return Err(ForecastError::Fit("sum of squared errors overflowed".to_string()));
    }

    Ok(Smoothed {
        fitted,
        level,
        trend,
        seasonals,
        sse,
    })
}

/// A fitted Holt-Winters model.
#[derive(Debug, Clone, Serialize)]
pub struct SmoothingModel {
    params: SmoothingParams,
    trend_type: ComponentType,
    seasonal_type: ComponentType,
    seasonal_period: usize,
    initial: InitialState,
    /// Level after the last training observation.
    level: f64,
    /// Trend after the last training observation.
    trend: f64,
    /// Latest seasonal index for each position `t mod period`.
    seasonals: Vec<f64>,
    fitted: TimeSeries,
    residuals: Vec<f64>,
    sse: f64,
    residual_variance: f64,
    training_start: Period,
    training_len: usize,
}

impl SmoothingModel {
    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    pub fn trend_type(&self) -> ComponentType {
        self.trend_type
    }

    pub fn seasonal_type(&self) -> ComponentType {
        self.seasonal_type
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    /// State the recurrence started from.
    pub fn initial_state(&self) -> &InitialState {
        &self.initial
    }

    /// Get the final level.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Get the final trend.
    pub fn trend(&self) -> f64 {
        self.trend
    }

    /// Get the final seasonal indices, indexed by position modulo the period.
    pub fn seasonals(&self) -> &[f64] {
        &self.seasonals
    }

    /// Sum of squared one-step-ahead errors over the fitted window.
    pub fn sse(&self) -> f64 {
        self.sse
    }

    /// Mean squared one-step-ahead error.
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Number of training observations.
    pub fn training_len(&self) -> usize {
        self.training_len
    }

    /// First period after the training window.
    pub fn forecast_start(&self) -> Period {
        self.training_start.offset(self.training_len as i64)
    }

    fn point_forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if horizon == 0 {
            return Err(ForecastError::Validation(
                "forecast horizon must be positive".to_string(),
            ));
        }
        let period = self.seasonal_period;

        let predictions: Vec<f64> = (1..=horizon)
            .map(|h| {
                let s = self.seasonals[(self.training_len + h - 1) % period];
                let base = match self.trend_type {
                    ComponentType::Additive => self.level + h as f64 * self.trend,
                    ComponentType::Multiplicative => self.level * self.trend.powi(h as i32),
                };
                self.seasonal_type.combine(base, s)
            })
            .collect();

        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(ForecastError::Fit(
                "extrapolation produced non-finite values".to_string(),
            ));
        }
        Ok(predictions)
    }
}

impl Forecaster for SmoothingModel {
    fn forecast(&self, horizon: usize) -> Result<Forecast> {
        let predictions = self.point_forecast(horizon)?;
        Ok(Forecast::from_values(self.forecast_start(), predictions))
    }

    fn forecast_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::Validation(format!(
                "interval level must be in (0, 1), got {level}"
            )));
        }
        let predictions = self.point_forecast(horizon)?;
        let z = quantile_normal((1.0 + level) / 2.0);

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (i, pred) in predictions.iter().enumerate() {
            // Simplified standard error: grows with each started seasonal cycle
            let cycles = i / self.seasonal_period + 1;
            let se = (self.residual_variance * cycles as f64).sqrt();
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

        Forecast::from_values_with_intervals(
            self.forecast_start(),
            predictions,
            lower,
            upper,
            level,
        )
    }

    fn predict_range(&self, from: Period, to: Period) -> Result<TimeSeries> {
        let window = match self.fitted.end() {
            Some(end) => (self.fitted.start(), end),
            None => {
                return Err(ForecastError::Validation(
                    "model has no in-sample predictions".to_string(),
                ))
            }
        };
        if from > to || from < window.0 || to > window.1 {
            return Err(ForecastError::Validation(format!(
                "in-sample predictions cover {}..={}, requested {from}..={to}",
                window.0, window.1
            )));
        }
        self.fitted.slice_periods(from, to)
    }

    fn fitted_values(&self) -> &TimeSeries {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn name(&self) -> &str {
        match (self.trend_type, self.seasonal_type) {
            (ComponentType::Additive, ComponentType::Additive) => "HoltWinters(additive)",
            (ComponentType::Additive, ComponentType::Multiplicative) => {
                "HoltWinters(multiplicative)"
            }
            (ComponentType::Multiplicative, ComponentType::Additive) => {
                "HoltWinters(multiplicative trend, additive season)"
            }
            (ComponentType::Multiplicative, ComponentType::Multiplicative) => {
                "HoltWinters(multiplicative trend, multiplicative season)"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::optimization::{CoordinateDescent, NelderMead, NelderMeadConfig, Solution};
    use approx::assert_relative_eq;

    fn jan(year: i32) -> Period {
        Period::new(year, 1).unwrap()
    }

    fn make_seasonal_data(n: usize, period: usize, trend: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                let seasonal = amplitude * (2.0 * std::f64::consts::PI * t / period as f64).sin();
                100.0 + trend * t + seasonal
            })
            .collect()
    }

    fn fixed(alpha: f64, beta: f64, gamma: f64) -> SmoothingParams {
        SmoothingParams::new(alpha, beta, gamma).unwrap()
    }

    #[test]
    fn hw_additive_recurrence_matches_hand_computation() {
        let ts = TimeSeries::new(jan(2020), vec![10.0, 20.0, 12.0, 22.0, 14.0]);

        let model = HoltWinters::additive(2)
            .with_params(fixed(0.5, 0.5, 0.5))
            .fit(&ts)
            .unwrap();

        assert_eq!(model.initial_state().level, 15.0);
        assert_eq!(model.initial_state().trend, 1.0);
        assert_eq!(model.initial_state().seasonals, vec![-5.0, 5.0]);

        assert_eq!(model.fitted_values().values(), &[11.0, 22.75, 13.6875]);
        assert_eq!(model.fitted_values().start(), Period::new(2020, 3).unwrap());
        assert_relative_eq!(model.sse(), 1.66015625, epsilon = 1e-12);
        assert_relative_eq!(model.level(), 18.59375, epsilon = 1e-12);
        assert_relative_eq!(model.trend(), 1.140625, epsilon = 1e-12);
        assert_eq!(model.seasonals(), &[-4.671875, 4.8125]);

        let forecast = model.forecast(2).unwrap();
        assert_relative_eq!(forecast.point()[0], 24.546875, epsilon = 1e-12);
        assert_relative_eq!(forecast.point()[1], 16.203125, epsilon = 1e-12);
        assert_eq!(forecast.start(), Period::new(2020, 6).unwrap());
    }

    #[test]
    fn hw_multiplicative_initial_seasonals_average_to_one() {
        let values: Vec<f64> = (0..36)
            .map(|i| {
                let base = 100.0 + 0.5 * i as f64;
                let seasonal = 1.0 + 0.2 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
                base * seasonal
            })
            .collect();
        let ts = TimeSeries::new(jan(2019), values);

        let model = HoltWinters::multiplicative(12)
            .with_params(fixed(0.3, 0.1, 0.1))
            .fit(&ts)
            .unwrap();

        let initial = &model.initial_state().seasonals;
        assert_eq!(initial.len(), 12);
        assert_relative_eq!(mean(initial), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hw_fitted_values_and_residuals_are_aligned() {
        let values = make_seasonal_data(30, 6, 0.5, 8.0);
        let ts = TimeSeries::new(jan(2020), values.clone());

        let model = HoltWinters::additive(6)
            .with_params(fixed(0.3, 0.1, 0.1))
            .fit(&ts)
            .unwrap();

        let fitted = model.fitted_values();
        assert_eq!(fitted.len(), 24);
        assert_eq!(fitted.start(), ts.period_at(6));
        assert_eq!(fitted.end(), ts.end());

        let residuals = model.residuals();
        for i in 0..24 {
            assert_relative_eq!(residuals[i], values[i + 6] - fitted.values()[i], epsilon = 1e-10);
        }
        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        assert_relative_eq!(model.sse(), sse, epsilon = 1e-9);
    }

    #[test]
    fn hw_optimization_improves_on_grid_point() {
        let ts = TimeSeries::new(jan(2018), make_seasonal_data(48, 12, 1.5, 20.0));

        let reference = HoltWinters::multiplicative(12)
            .with_params(fixed(0.3, 0.1, 0.1))
            .fit(&ts)
            .unwrap();
        let model = HoltWinters::multiplicative(12).fit(&ts).unwrap();

        let params = model.params();
        for p in [params.alpha, params.beta, params.gamma] {
            assert!((0.0..=1.0).contains(&p));
        }
        assert!(model.sse() <= reference.sse());
    }

    #[test]
    fn hw_coordinate_descent_is_a_drop_in_solver() {
        let ts = TimeSeries::new(jan(2018), make_seasonal_data(48, 12, 1.5, 20.0));

        let reference = HoltWinters::additive(12)
            .with_params(fixed(0.3, 0.1, 0.1))
            .fit(&ts)
            .unwrap();
        let model = HoltWinters::additive(12)
            .with_solver(CoordinateDescent::default())
            .fit(&ts)
            .unwrap();

        assert!(model.sse() <= reference.sse());
    }

    #[test]
    fn hw_fit_is_deterministic() {
        let ts = TimeSeries::new(jan(2018), make_seasonal_data(40, 12, 2.0, 15.0));
        let spec = HoltWinters::multiplicative(12);

        let a = spec.fit(&ts).unwrap();
        let b = spec.fit(&ts).unwrap();

        assert_eq!(a.params(), b.params());
        assert_eq!(a.fitted_values(), b.fitted_values());
    }

    #[test]
    fn hw_requires_two_full_cycles() {
        let short = TimeSeries::new(jan(2020), make_seasonal_data(23, 12, 1.0, 5.0));
        assert!(matches!(
            HoltWinters::additive(12).fit(&short),
            Err(ForecastError::Fit(_))
        ));

        let exact = TimeSeries::new(jan(2020), make_seasonal_data(24, 12, 1.0, 5.0));
        let model = HoltWinters::multiplicative(12).fit(&exact).unwrap();
        assert_eq!(model.fitted_values().len(), 12);
    }

    #[test]
    fn hw_multiplicative_rejects_zero_values() {
        let mut values = make_seasonal_data(36, 12, 1.0, 5.0);
        values[17] = 0.0;
        let ts = TimeSeries::new(jan(2020), values);

        let err = HoltWinters::multiplicative(12).fit(&ts).unwrap_err();
        match err {
            ForecastError::Fit(msg) => assert!(msg.contains("2021-06")),
            other => panic!("unexpected error: {other:?}"),
        }

        // The additive model has no such precondition.
        assert!(HoltWinters::additive(12).fit(&ts).is_ok());
    }

    #[test]
    fn hw_rejects_non_finite_values() {
        let mut values = make_seasonal_data(36, 12, 1.0, 5.0);
        values[3] = f64::NAN;
        let ts = TimeSeries::new(jan(2020), values);

        assert!(matches!(
            HoltWinters::additive(12).fit(&ts),
            Err(ForecastError::Fit(_))
        ));
    }

    #[test]
    fn hw_rejects_degenerate_period() {
        let ts = TimeSeries::new(jan(2020), vec![1.0; 10]);
        assert!(matches!(
            HoltWinters::additive(1).fit(&ts),
            Err(ForecastError::Validation(_))
        ));
    }

    /// Solver whose every evaluation diverges.
    #[derive(Debug)]
    struct DivergingSolver;

    impl Solver for DivergingSolver {
        fn minimize(&self, _: &dyn Fn(&[f64]) -> f64, bounds: &[(f64, f64)]) -> Solution {
            Solution {
                point: vec![0.5; bounds.len()],
                value: f64::INFINITY,
                iterations: 1,
                converged: true,
            }
        }

        fn name(&self) -> &str {
            "diverging"
        }
    }

    #[test]
    fn hw_fails_when_solver_hits_iteration_cap() {
        let ts = TimeSeries::new(jan(2020), make_seasonal_data(36, 12, 1.0, 5.0));
        let capped = NelderMead::new(NelderMeadConfig {
            max_iter: 1,
            ..Default::default()
        });

        match HoltWinters::multiplicative(12).with_solver(capped).fit(&ts) {
            Err(ForecastError::Fit(msg)) => {
                assert!(msg.contains("nelder-mead did not converge"), "{msg}")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn hw_fails_when_no_parameters_give_finite_sse() {
        let ts = TimeSeries::new(jan(2020), make_seasonal_data(36, 12, 1.0, 5.0));

        let err = HoltWinters::additive(12)
            .with_solver(DivergingSolver)
            .fit(&ts)
            .unwrap_err();
        assert_eq!(
            err,
            ForecastError::Fit("no smoothing parameters give a finite fit".to_string())
        );
    }

    #[test]
    fn hw_fails_when_recurrence_overflows() {
        // Trend starts near f64::MAX / 2, so level + trend overflows at step 3.
        let big = 1.7e308;
        let ts = TimeSeries::new(jan(2020), vec![0.0, 0.0, big, big, big]);

        let err = HoltWinters::additive(2)
            .with_params(fixed(1.0, 1.0, 0.5))
            .fit(&ts)
            .unwrap_err();
        match err {
            ForecastError::Fit(msg) => assert!(msg.contains("non-finite state at step 3"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn smoothing_params_must_be_in_unit_interval() {
        assert!(SmoothingParams::new(0.0, 0.5, 1.0).is_ok());
        assert!(SmoothingParams::new(1.1, 0.5, 0.5).is_err());
        assert!(SmoothingParams::new(0.5, -0.1, 0.5).is_err());
        assert!(SmoothingParams::new(0.5, 0.5, f64::NAN).is_err());
    }

    #[test]
    fn hw_forecast_continues_after_training_window() {
        let ts = TimeSeries::new(Period::new(2020, 5).unwrap(), make_seasonal_data(30, 12, 1.0, 5.0));
        let model = HoltWinters::additive(12).fit(&ts).unwrap();

        let forecast = model.forecast(14).unwrap();
        assert_eq!(forecast.horizon(), 14);
        assert_eq!(forecast.start(), ts.end().unwrap().succ());
        assert!(forecast.point().iter().all(|v| v.is_finite()));

        assert!(matches!(
            model.forecast(0),
            Err(ForecastError::Validation(_))
        ));
    }

    #[test]
    fn hw_forecast_repeats_the_seasonal_cycle() {
        let values = make_seasonal_data(36, 4, 0.0, 3.0);
        let ts = TimeSeries::new(jan(2020), values);
        let model = HoltWinters::additive(4)
            .with_params(fixed(0.5, 0.1, 0.5))
            .fit(&ts)
            .unwrap();

        let preds = model.forecast(12).unwrap();
        let preds = preds.point();
        for i in 0..4 {
            let (s1, s2, s3) = (preds[i], preds[i + 4], preds[i + 8]);
            assert!((s1 - s2).abs() / s1.abs().max(1.0) < 0.2);
            assert!((s2 - s3).abs() / s2.abs().max(1.0) < 0.2);
        }
    }

    #[test]
    fn hw_multiplicative_trend_follows_growth() {
        // 2% monthly growth with a mild seasonal pattern.
        let values: Vec<f64> = (0..36)
            .map(|i| {
                let growth = 100.0 * 1.02_f64.powi(i);
                growth * (1.0 + 0.1 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).cos())
            })
            .collect();
        let ts = TimeSeries::new(jan(2020), values);

        let model = HoltWinters::multiplicative(12)
            .with_trend(ComponentType::Multiplicative)
            .with_params(fixed(0.5, 0.1, 0.3))
            .fit(&ts)
            .unwrap();

        assert_relative_eq!(model.initial_state().trend, 1.02, epsilon = 1e-3);
        let forecast = model.forecast(12).unwrap();
        let last_year: f64 = ts.values()[24..].iter().sum();
        let next_year: f64 = forecast.point().iter().sum();
        assert!(next_year > last_year);
        assert_eq!(
            model.name(),
            "HoltWinters(multiplicative trend, multiplicative season)"
        );
    }

    #[test]
    fn hw_intervals_bracket_point_forecast() {
        let ts = TimeSeries::new(jan(2020), make_seasonal_data(36, 12, 0.5, 10.0));
        let mut values = ts.values().to_vec();
        for (i, v) in values.iter_mut().enumerate() {
            *v += if i % 2 == 0 { 1.5 } else { -1.5 };
        }
        let ts = TimeSeries::new(jan(2020), values);
        let model = HoltWinters::additive(12)
            .with_params(fixed(0.3, 0.1, 0.1))
            .fit(&ts)
            .unwrap();

        let forecast = model.forecast_with_intervals(24, 0.95).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        for (i, p) in forecast.point().iter().enumerate() {
            assert!(lower[i] < *p && *p < upper[i]);
        }
        // Second cycle is wider than the first.
        assert!(upper[12] - lower[12] > upper[0] - lower[0]);

        assert!(model.forecast_with_intervals(4, 1.5).is_err());
    }

    #[test]
    fn hw_predict_range_returns_in_sample_predictions() {
        let ts = TimeSeries::new(jan(2020), make_seasonal_data(36, 12, 1.0, 5.0));
        let model = HoltWinters::additive(12).fit(&ts).unwrap();

        let from = Period::new(2022, 6).unwrap();
        let to = Period::new(2022, 12).unwrap();
        let predicted = model.predict_range(from, to).unwrap();

        assert_eq!(predicted.start(), from);
        assert_eq!(predicted.len(), 7);
        let offset = model.fitted_values().index_of(from).unwrap();
        assert_eq!(
            predicted.values(),
            &model.fitted_values().values()[offset..offset + 7]
        );

        // The first cycle only initializes the state.
        assert!(matches!(
            model.predict_range(jan(2020), Period::new(2020, 6).unwrap()),
            Err(ForecastError::Validation(_))
        ));
        // Beyond the training window.
        assert!(model.predict_range(from, Period::new(2023, 2).unwrap()).is_err());
        // Reversed range.
        assert!(model.predict_range(to, from).is_err());
    }

    #[test]
    fn hw_name_reflects_type() {
        let ts = TimeSeries::new(jan(2020), make_seasonal_data(24, 12, 1.0, 5.0));
        let add = HoltWinters::additive(12)
            .with_params(fixed(0.3, 0.1, 0.1))
            .fit(&ts)
            .unwrap();
        let mul = HoltWinters::multiplicative(12)
            .with_params(fixed(0.3, 0.1, 0.1))
            .fit(&ts)
            .unwrap();

        assert_eq!(add.name(), "HoltWinters(additive)");
        assert_eq!(mul.name(), "HoltWinters(multiplicative)");
    }

    #[test]
    fn hw_default() {
        let model = HoltWinters::default();
        assert_eq!(model.seasonal_period(), 12);
        assert_eq!(model.trend_type(), ComponentType::Additive);
        assert_eq!(model.seasonal_type(), ComponentType::Multiplicative);
        assert!(model.params.is_none());
    }
}
