//! Distribution specifications and sampling
//!
//! Every stochastic quantity in a scenario (returns, investment income,
//! inflation, life expectancy, event timing) is described by a
//! [`DistributionSpec`]. Sampling never touches a global generator: callers
//! pass the run's own random source explicitly.

use std::f64::consts::TAU;

use rand::Rng;
use rand_distr::{Distribution, OpenClosed01, StandardUniform};
use serde::{Deserialize, Serialize};

/// A one-dimensional distribution to draw yearly values from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistributionSpec {
    Fixed { value: f64 },
    Normal { mean: f64, std_dev: f64 },
    Uniform { lower: f64, upper: f64 },
}

impl Default for DistributionSpec {
    fn default() -> Self {
        DistributionSpec::Fixed { value: 0.0 }
    }
}

impl DistributionSpec {
    #[must_use]
    pub const fn fixed(value: f64) -> Self {
        DistributionSpec::Fixed { value }
    }

    #[must_use]
    pub const fn normal(mean: f64, std_dev: f64) -> Self {
        DistributionSpec::Normal { mean, std_dev }
    }

    #[must_use]
    pub const fn uniform(lower: f64, upper: f64) -> Self {
        DistributionSpec::Uniform { lower, upper }
    }

    /// Reason the parameters cannot be sampled meaningfully, if any.
    ///
    /// Sampling itself never checks this; scenarios are validated up front.
    #[must_use]
    pub fn parameter_problem(&self) -> Option<&'static str> {
        match *self {
            DistributionSpec::Fixed { value } => {
                (!value.is_finite()).then_some("fixed value must be finite")
            }
            DistributionSpec::Normal { mean, std_dev } => {
                if !mean.is_finite() {
                    Some("mean must be finite")
                } else if !(std_dev.is_finite() && std_dev >= 0.0) {
                    Some("std_dev must be non-negative and finite")
                } else {
                    None
                }
            }
            DistributionSpec::Uniform { lower, upper } => {
                if !(lower.is_finite() && upper.is_finite()) {
                    Some("bounds must be finite")
                } else if lower > upper {
                    Some("lower bound exceeds upper bound")
                } else {
                    None
                }
            }
        }
    }
}

impl Distribution<f64> for DistributionSpec {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            DistributionSpec::Fixed { value } => value,
            DistributionSpec::Normal { mean, std_dev } => sample_normal(rng, mean, std_dev),
            DistributionSpec::Uniform { lower, upper } => sample_uniform(rng, lower, upper),
        }
    }
}

/// Box-Muller transform over two independent uniform draws.
pub fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    // (0, 1] keeps ln() finite
    let u1: f64 = rng.sample(OpenClosed01);
    let u2: f64 = rng.sample(StandardUniform);
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    mean + std_dev * z
}

pub fn sample_uniform<R: Rng + ?Sized>(rng: &mut R, lower: f64, upper: f64) -> f64 {
    let u: f64 = rng.sample(StandardUniform);
    lower + u * (upper - lower)
}

/// Whether a sampled change is a currency delta or a fractional rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountMode {
    /// Sample is a flat currency amount
    Flat,
    /// Sample is a fraction of the base value
    #[default]
    Percent,
}

/// A distribution together with an explicit interpretation of its samples
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeSpec {
    #[serde(default)]
    pub mode: AmountMode,
    pub distribution: DistributionSpec,
}

impl ChangeSpec {
    #[must_use]
    pub const fn percent(distribution: DistributionSpec) -> Self {
        Self {
            mode: AmountMode::Percent,
            distribution,
        }
    }

    #[must_use]
    pub const fn flat(distribution: DistributionSpec) -> Self {
        Self {
            mode: AmountMode::Flat,
            distribution,
        }
    }

    /// No change at all
    #[must_use]
    pub const fn none() -> Self {
        Self::percent(DistributionSpec::fixed(0.0))
    }

    /// Advance `amount` by one sampled change.
    pub fn advance<R: Rng + ?Sized>(&self, amount: f64, rng: &mut R) -> f64 {
        let change = self.distribution.sample(rng);
        match self.mode {
            AmountMode::Flat => amount + change,
            AmountMode::Percent => amount * (1.0 + change),
        }
    }

    /// The sampled delta generated by `base` (a return or an income yield).
    pub fn delta_on<R: Rng + ?Sized>(&self, base: f64, rng: &mut R) -> f64 {
        let change = self.distribution.sample(rng);
        match self.mode {
            AmountMode::Flat => change,
            AmountMode::Percent => base * change,
        }
    }
}
