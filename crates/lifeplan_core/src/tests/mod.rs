//! Scenario-level tests for the simulation engine
//!
//! Tests are organized by topic:
//! - `basic` - Run horizon, determinism, batches and stop conditions
//! - `taxes` - One-year tax lag, bracket indexing, filing status
//! - `rmd` - Required minimum distributions
//! - `roth` - Bracket-filling Roth conversions
//! - `withdrawals` - Expense funding, discretionary spending, insolvency
//! - `events` - Event timing, amount changes, inflation, mortality
//! - `invest_rebalance` - Cash sweeps, contribution caps, glide paths, rebalancing
//! - `exploration` - 1-D and 2-D parameter sweeps

mod roth;
mod withdrawals;

use crate::config::SimulationOptions;
use crate::model::{InvestmentType, RunOutcome, Scenario, TaxData};
use crate::simulation::simulate;

/// First simulated year in every scenario test
pub(crate) const START: i32 = 2025;

pub(crate) fn options() -> SimulationOptions {
    SimulationOptions::default().with_start_year(START)
}

pub(crate) fn run(scenario: &Scenario) -> RunOutcome {
    simulate(scenario, &TaxData::us_2024(), &options()).unwrap()
}

/// Investment type with no return, income or fees
pub(crate) fn fund(id: &str) -> InvestmentType {
    InvestmentType::new(id)
}

#[track_caller]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.011,
        "expected {expected}, got {actual}"
    );
}
