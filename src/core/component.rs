//! How two model components combine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a component enters a model additively or multiplicatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    /// Components are summed: `a + b`.
    #[default]
    Additive,
    /// Components are multiplied: `a * b`.
    Multiplicative,
}

impl ComponentType {
    /// Combine `base` with `component` according to the mode.
    pub fn combine(self, base: f64, component: f64) -> f64 {
        match self {
            ComponentType::Additive => base + component,
            ComponentType::Multiplicative => base * component,
        }
    }

    /// Remove `component` from `value`, the inverse of [`combine`](Self::combine).
    pub fn remove(self, value: f64, component: f64) -> f64 {
        match self {
            ComponentType::Additive => value - component,
            ComponentType::Multiplicative => value / component,
        }
    }

    /// Neutral element: 0 for additive, 1 for multiplicative.
    pub fn identity(self) -> f64 {
        match self {
            ComponentType::Additive => 0.0,
            ComponentType::Multiplicative => 1.0,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentType::Additive => f.write_str("additive"),
            ComponentType::Multiplicative => f.write_str("multiplicative"),
        }
    }
}
