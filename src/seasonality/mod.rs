//! Seasonal decomposition.
//!
//! Classical decomposition splits a monthly series into a centered moving
//! average trend, a repeating seasonal pattern and a residual, in either
//! additive or multiplicative form.

mod classical;

pub use classical::{ClassicalDecomposition, DecompositionResult};
