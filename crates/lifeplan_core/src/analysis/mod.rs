//! Parameter exploration
//!
//! Runs a Monte Carlo batch for every value (1-D) or value pair (2-D) of one
//! or two scenario parameters, to study how outcomes respond to them.
//!
//! ```ignore
//! use lifeplan_core::analysis::{ExplorationConfig, SweepAxis, explore};
//!
//! let axis = SweepAxis::new("start:Retirement".parse()?, 2045.0, 2055.0, 1.0);
//! let config = ExplorationConfig::one_d(axis, 200, SimulationOptions::default());
//! let result = explore(&scenario, &tax_data, &config, None)?;
//! for point in result.points.data() {
//!     println!("{:?}: {:.1}%", point.values, point.summary.success_rate * 100.0);
//! }
//! ```

mod config;
mod evaluator;

pub use config::*;
pub use evaluator::*;
