//! Command-line front end for the lifeplan simulation engine
//!
//! Loads a scenario document and a tax data directory, runs a Monte Carlo
//! batch or a parameter sweep, and writes the results as JSON or YAML.

pub mod commands;
pub mod data;
pub mod logging;
pub mod util;

pub use commands::{ExploreArgs, RunArgs, run_batch, run_exploration};
pub use logging::init_logging;
