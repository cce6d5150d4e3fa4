//! One module per step of the yearly state machine.
//!
//! Each step reads the immutable scenario and mutates the run's
//! [`SimulationState`](crate::simulation_state::SimulationState) in place.

pub(crate) mod expenses;
pub(crate) mod growth;
pub(crate) mod income;
pub(crate) mod invest;
pub(crate) mod rebalance;
pub(crate) mod rmd;
pub(crate) mod roth;

use rand::Rng;

use crate::model::ChangeSpec;
use crate::simulation_state::EventRuntime;

/// Obligations that could not be met this year
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Shortfall(pub f64);

/// Returns the event's amount for this year and advances it for the next.
pub(crate) fn take_amount<R: Rng + ?Sized>(
    runtime: &mut EventRuntime,
    initial_amount: f64,
    change: &ChangeSpec,
    rng: &mut R,
) -> f64 {
    let current = runtime.current_amount(initial_amount);
    runtime.amount = Some(change.advance(current, rng));
    current
}
