//! Run configuration
//!
//! [`SimulationOptions`] and [`BatchConfig`] control how a scenario is run.
//! The scenario itself is plain data (see [`crate::model::Scenario`]) and can
//! be deserialized or assembled with the builder DSL.
//!
//! # Builder DSL
//!
//! ```ignore
//! use lifeplan_core::config::{EventBuilder, ScenarioBuilder};
//! use lifeplan_core::model::DistributionSpec;
//!
//! let scenario = ScenarioBuilder::new("Baseline", 1985)
//!     .life_expectancy(DistributionSpec::normal(85.0, 5.0))
//!     .inflation(DistributionSpec::fixed(0.025))
//!     .with_cash(10_000.0)
//!     .event(EventBuilder::income("Salary", 75_000.0).starting(2025).lasting(30.0))
//!     .event(EventBuilder::expense("Rent", 24_000.0).starting(2025).inflation_adjusted())
//!     .build();
//! ```

use serde::{Deserialize, Serialize};

pub mod builder;
pub mod event_builder;

pub use builder::ScenarioBuilder;
pub use event_builder::EventBuilder;

/// Largest number of simulated years a run may need
pub const DEFAULT_MAX_YEARS: u32 = 150;

/// Options for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// First simulated year; the current calendar year when unset
    pub start_year: Option<i32>,
    pub seed: u64,
    /// Runs whose sampled horizon is longer than this are skipped
    pub max_years: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            start_year: None,
            seed: 0,
            max_years: DEFAULT_MAX_YEARS,
        }
    }
}

impl SimulationOptions {
    #[must_use]
    pub fn with_start_year(mut self, year: i32) -> Self {
        self.start_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn resolved_start_year(&self) -> i32 {
        self.start_year
            .unwrap_or_else(|| i32::from(jiff::Zoned::now().year()))
    }
}

/// Options for a Monte Carlo batch; `options.seed` is the base seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub runs: usize,
    pub options: SimulationOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            runs: 100,
            options: SimulationOptions::default(),
        }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn new(runs: usize, options: SimulationOptions) -> Self {
        Self { runs, options }
    }
}
