//! Household financial planning simulation library
//!
//! This crate provides a Monte Carlo engine for long-horizon retirement
//! planning. Each run steps a household through one year at a time until the
//! primary holder's sampled end year. It supports:
//! - Income, expense, invest and rebalance event series with sampled or
//!   event-relative start years and durations
//! - Non-retirement, pre-tax and after-tax holdings with cost basis tracking
//! - Federal, state, capital gains and early-withdrawal taxes, settled a year
//!   late against inflation-indexed brackets
//! - Required minimum distributions and bracket-filling Roth conversions
//! - Discretionary spending bounded by a financial goal
//! - 1-D and 2-D parameter exploration over Monte Carlo batches
//!
//! # Builder DSL
//!
//! ```ignore
//! use lifeplan_core::config::{BatchConfig, EventBuilder, ScenarioBuilder, SimulationOptions};
//! use lifeplan_core::model::{DistributionSpec, TaxData};
//!
//! let scenario = ScenarioBuilder::new("Baseline", 1985)
//!     .life_expectancy(DistributionSpec::normal(85.0, 5.0))
//!     .with_cash(25_000.0)
//!     .event(EventBuilder::income("Salary", 75_000.0).starting(2025).lasting(35.0).build())
//!     .event(EventBuilder::expense("Living", 40_000.0).starting(2025).inflation_adjusted().build())
//!     .build();
//!
//! let batch = lifeplan_core::simulation::monte_carlo_simulate(
//!     &scenario,
//!     &TaxData::us_2024(),
//!     &BatchConfig::new(500, SimulationOptions::default()),
//!     None,
//! )?;
//! println!("success rate: {:.1}%", batch.summary().success_rate * 100.0);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod control;
pub mod error;
pub mod liquidation;
mod processors;
pub mod scheduler;
pub mod simulation;
pub mod simulation_state;
pub mod taxes;
pub mod validation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{BatchConfig, EventBuilder, ScenarioBuilder, SimulationOptions};
pub use control::RunControl;
pub use error::{ExplorationError, SimulationError, TaxDataError, ValidationError, ValidationIssue};
pub use simulation::{monte_carlo_simulate, simulate, simulate_with_control};
