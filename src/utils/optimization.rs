//! Bounded minimizers used for smoothing-parameter estimation.
//!
//! Every solver implements [`Solver`]: given an objective and a box of
//! bounds it returns the best point found. Both solvers start from a
//! deterministic coarse [`grid_search`] so that repeated fits of the same
//! data land on the same optimum.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of a bounded minimization.
#[derive(Debug, Clone)]
pub struct Solution {
    /// The optimal point found.
    pub point: Vec<f64>,
    /// The objective function value at the optimal point.
    pub value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged.
    pub converged: bool,
}

/// A bounded nonlinear minimizer.
pub trait Solver: fmt::Debug + Send + Sync {
    /// Minimize `objective` over the box described by `bounds`.
    ///
    /// Non-finite objective values are treated as `+inf`.
    fn minimize(&self, objective: &dyn Fn(&[f64]) -> f64, bounds: &[(f64, f64)]) -> Solution;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Available solver implementations, for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverKind {
    #[default]
    NelderMead,
    CoordinateDescent,
}

impl SolverKind {
    /// Instantiate the solver with default settings.
    pub fn build(self) -> Box<dyn Solver> {
        match self {
            SolverKind::NelderMead => Box::new(NelderMead::default()),
            SolverKind::CoordinateDescent => Box::new(CoordinateDescent::default()),
        }
    }
}

fn finite_or_inf(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::INFINITY
    }
}

/// Evaluate `objective` on a regular grid and return the best point.
///
/// Each dimension is split into `steps` equal cells and sampled at the cell
/// midpoints, so bounds themselves are never sampled. Ties keep the first
/// point in lexicographic order.
pub fn grid_search(
    objective: &dyn Fn(&[f64]) -> f64,
    bounds: &[(f64, f64)],
    steps: usize,
) -> (Vec<f64>, f64) {
    let steps = steps.max(1);
    let dims = bounds.len();
    if dims == 0 {
        return (vec![], f64::NAN);
    }

    let coordinate = |dim: usize, k: usize| {
        let (lo, hi) = bounds[dim];
        lo + (k as f64 + 0.5) * (hi - lo) / steps as f64
    };

    let mut counters = vec![0usize; dims];
    let mut point: Vec<f64> = (0..dims).map(|d| coordinate(d, 0)).collect();
    let mut best_point = point.clone();
    let mut best_value = f64::INFINITY;

    loop {
        let value = finite_or_inf(objective(&point));
        if value < best_value {
            best_value = value;
            best_point.copy_from_slice(&point);
        }

        // Advance the mixed-radix counter.
        let mut dim = 0;
        loop {
            if dim == dims {
                return (best_point, best_value);
            }
            counters[dim] += 1;
            if counters[dim] < steps {
                point[dim] = coordinate(dim, counters[dim]);
                break;
            }
            counters[dim] = 0;
            point[dim] = coordinate(dim, 0);
            dim += 1;
        }
    }
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance, relative to the best objective value.
    pub tolerance: f64,
    /// Reflection coefficient (default: 1.0).
    pub alpha: f64,
    /// Expansion coefficient (default: 2.0).
    pub gamma: f64,
    /// Contraction coefficient (default: 0.5).
    pub rho: f64,
    /// Shrinkage coefficient (default: 0.5).
    pub sigma: f64,
    /// Initial simplex step size (default: 0.05).
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-10,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Perform bounded Nelder-Mead simplex optimization from `initial`.
///
/// Trial points are projected onto `bounds` before evaluation.
///
/// # Example
/// ```
/// use sales_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// // Minimize (x-0.2)^2 + (y-0.7)^2 on the unit square
/// let result = nelder_mead(
///     &|x: &[f64]| (x[0] - 0.2).powi(2) + (x[1] - 0.7).powi(2),
///     &[0.5, 0.5],
///     &[(0.0, 1.0), (0.0, 1.0)],
///     &NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.point[0] - 0.2).abs() < 0.01);
/// assert!((result.point[1] - 0.7).abs() < 0.01);
/// ```
pub fn nelder_mead(
    objective: &dyn Fn(&[f64]) -> f64,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: &NelderMeadConfig,
) -> Solution {
    let n = initial.len();
    if n == 0 {
        return Solution {
            point: vec![],
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let f = |x: &[f64]| finite_or_inf(objective(x));

    // Initialize simplex with n+1 vertices
    let start = apply_bounds(initial, bounds);
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.clone());

    for i in 0..n {
        let mut vertex = start.clone();
        let step = if start[i].abs() > 1e-10 {
            config.initial_step * start[i].abs()
        } else {
            config.initial_step
        };
        // Step inwards when the vertex would be clamped onto the start point.
        let upper = bounds.get(i).map(|b| b.1).unwrap_or(f64::INFINITY);
        if vertex[i] + step > upper {
            vertex[i] -= step;
        } else {
            vertex[i] += step;
        }
        simplex.push(apply_bounds(&vertex, bounds));
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut indices: Vec<usize> = (0..=n).collect();
        indices.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let best_idx = indices[0];
        let worst_idx = indices[n];
        let second_worst_idx = indices[n - 1];

        // Check convergence
        let range = values[worst_idx] - values[best_idx];
        if range <= config.tolerance * (1.0 + values[best_idx].abs()) {
            converged = true;
            break;
        }

        // Also check if simplex has collapsed
        let centroid = compute_centroid(&simplex, worst_idx);
        let max_dist = simplex
            .iter()
            .map(|v| euclidean_distance(v, &centroid))
            .fold(0.0, f64::max);
        if max_dist < config.tolerance {
            converged = true;
            break;
        }

        // Reflection
        let reflected = apply_bounds(&reflect(&simplex[worst_idx], &centroid, config.alpha), bounds);
        let reflected_value = f(&reflected);

        if reflected_value < values[second_worst_idx] && reflected_value >= values[best_idx] {
            simplex[worst_idx] = reflected;
            values[worst_idx] = reflected_value;
            continue;
        }

        if reflected_value < values[best_idx] {
            let expanded = apply_bounds(&expand(&centroid, &reflected, config.gamma), bounds);
            let expanded_value = f(&expanded);

            if expanded_value < reflected_value {
                simplex[worst_idx] = expanded;
                values[worst_idx] = expanded_value;
            } else {
                simplex[worst_idx] = reflected;
                values[worst_idx] = reflected_value;
            }
            continue;
        }

        // Contraction
        if reflected_value < values[worst_idx] {
            let contracted = apply_bounds(&contract(&centroid, &reflected, config.rho), bounds);
            let contracted_value = f(&contracted);

            if contracted_value <= reflected_value {
                simplex[worst_idx] = contracted;
                values[worst_idx] = contracted_value;
                continue;
            }
        } else {
            let contracted =
                apply_bounds(&contract(&centroid, &simplex[worst_idx], config.rho), bounds);
            let contracted_value = f(&contracted);

            if contracted_value < values[worst_idx] {
                simplex[worst_idx] = contracted;
                values[worst_idx] = contracted_value;
                continue;
            }
        }

        // Shrink
        let best = simplex[best_idx].clone();
        for i in 0..=n {
            if i != best_idx {
                for j in 0..n {
                    simplex[i][j] = best[j] + config.sigma * (simplex[i][j] - best[j]);
                }
                simplex[i] = apply_bounds(&simplex[i], bounds);
                values[i] = f(&simplex[i]);
            }
        }
    }

    let best_idx = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    Solution {
        point: simplex[best_idx].clone(),
        value: values[best_idx],
        iterations,
        converged,
    }
}

/// Nelder-Mead simplex search seeded from a coarse grid.
#[derive(Debug, Clone)]
pub struct NelderMead {
    pub config: NelderMeadConfig,
    /// Grid cells per dimension for the starting point.
    pub grid_steps: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            config: NelderMeadConfig::default(),
            grid_steps: 5,
        }
    }
}

impl NelderMead {
    pub fn new(config: NelderMeadConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn with_grid_steps(mut self, steps: usize) -> Self {
        self.grid_steps = steps;
        self
    }
}

impl Solver for NelderMead {
    fn minimize(&self, objective: &dyn Fn(&[f64]) -> f64, bounds: &[(f64, f64)]) -> Solution {
        let (seed, _) = grid_search(objective, bounds, self.grid_steps);
        nelder_mead(objective, &seed, bounds, &self.config)
    }

    fn name(&self) -> &str {
        "nelder-mead"
    }
}

/// Configuration for coordinate descent.
#[derive(Debug, Clone)]
pub struct CoordinateDescentConfig {
    /// Maximum number of full sweeps over all coordinates.
    pub max_sweeps: usize,
    /// Stop when a sweep improves the objective by less than this (relative).
    pub tolerance: f64,
    /// Width at which a golden-section line search stops.
    pub line_tolerance: f64,
    /// Grid cells per dimension for the starting point.
    pub grid_steps: usize,
}

impl Default for CoordinateDescentConfig {
    fn default() -> Self {
        Self {
            max_sweeps: 500,
            tolerance: 1e-9,
            line_tolerance: 1e-7,
            grid_steps: 5,
        }
    }
}

/// Cyclic coordinate descent with a golden-section search on each axis.
#[derive(Debug, Clone, Default)]
pub struct CoordinateDescent {
    pub config: CoordinateDescentConfig,
}

impl CoordinateDescent {
    pub fn new(config: CoordinateDescentConfig) -> Self {
        Self { config }
    }
}

impl Solver for CoordinateDescent {
    fn minimize(&self, objective: &dyn Fn(&[f64]) -> f64, bounds: &[(f64, f64)]) -> Solution {
        let f = |x: &[f64]| finite_or_inf(objective(x));
        let (mut point, mut value) = grid_search(objective, bounds, self.config.grid_steps);
        if point.is_empty() {
            return Solution {
                point,
                value,
                iterations: 0,
                converged: false,
            };
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_sweeps {
            iterations += 1;
            let before = value;

            for dim in 0..point.len() {
                let (lo, hi) = bounds[dim];
                let mut trial = point.clone();
                let best_x = golden_section(
                    |x| {
                        trial[dim] = x;
                        f(&trial)
                    },
                    lo,
                    hi,
                    self.config.line_tolerance,
                );

                let mut candidate = point.clone();
                candidate[dim] = best_x;
                let candidate_value = f(&candidate);
                if candidate_value < value {
                    point = candidate;
                    value = candidate_value;
                }
            }

            if before.is_finite() && before - value <= self.config.tolerance * (1.0 + value.abs()) {
                converged = true;
                break;
            }
        }

        Solution {
            point,
            value,
            iterations,
            converged,
        }
    }

    fn name(&self) -> &str {
        "coordinate-descent"
    }
}

/// Golden-section search for the minimum of `f` on `[lo, hi]`.
fn golden_section<F>(mut f: F, lo: f64, hi: f64, tolerance: f64) -> f64
where
    F: FnMut(f64) -> f64,
{
    let inv_phi = (5.0_f64.sqrt() - 1.0) / 2.0;
    let (mut a, mut b) = (lo, hi);
    let mut c = b - inv_phi * (b - a);
    let mut d = a + inv_phi * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);

    while (b - a).abs() > tolerance {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - inv_phi * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + inv_phi * (b - a);
            fd = f(d);
        }
    }

    (a + b) / 2.0
}

/// Compute centroid of simplex excluding the worst vertex.
fn compute_centroid(simplex: &[Vec<f64>], exclude_idx: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let count = simplex.len() - 1;
    let mut centroid = vec![0.0; n];

    for (i, vertex) in simplex.iter().enumerate() {
        if i != exclude_idx {
            for j in 0..n {
                centroid[j] += vertex[j];
            }
        }
    }

    for c in &mut centroid {
        *c /= count as f64;
    }

    centroid
}

/// Reflect a point through the centroid.
fn reflect(point: &[f64], centroid: &[f64], alpha: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point.iter())
        .map(|(c, p)| c + alpha * (c - p))
        .collect()
}

/// Expand from centroid towards reflected point.
fn expand(centroid: &[f64], reflected: &[f64], gamma: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(reflected.iter())
        .map(|(c, r)| c + gamma * (r - c))
        .collect()
}

/// Contract between centroid and a point.
fn contract(centroid: &[f64], point: &[f64], rho: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point.iter())
        .map(|(c, p)| c + rho * (p - c))
        .collect()
}

/// Project a point onto the bounding box.
fn apply_bounds(point: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    point
        .iter()
        .enumerate()
        .map(|(i, &x)| match bounds.get(i) {
            Some(&(lo, hi)) => x.clamp(lo, hi),
            None => x,
        })
        .collect()
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
