use crate::model::{EventKind, Scenario};
use crate::simulation_state::SimulationState;

use super::take_amount;

/// Credits every active income event to cash and the income accumulators.
pub(crate) fn process(scenario: &Scenario, state: &mut SimulationState, year: i32) {
    for (event, runtime) in scenario.events.iter().zip(state.events.iter_mut()) {
        let EventKind::Income(income) = &event.kind else {
            continue;
        };
        if !runtime.schedule.is_active(year) {
            continue;
        }

        let amount = take_amount(
            runtime,
            income.initial_amount,
            &income.expected_change,
            &mut state.rng,
        );
        state.portfolio.cash_mut().buy(amount);
        state.current.income += amount;
        if income.social_security {
            state.current.social_security += amount;
        }
    }
}
