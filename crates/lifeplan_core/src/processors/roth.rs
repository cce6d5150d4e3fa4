use tracing::debug;

use crate::liquidation::{WithdrawalPolicy, withdraw};
use crate::model::Scenario;
use crate::simulation_state::{SimulationState, round_cents};
use crate::taxes::{federal_bracket_containing, federal_taxable_income};

/// Converts enough pre-tax balance to fill the current federal bracket.
///
/// Nothing is converted in the top (unbounded) bracket.
pub(crate) fn process(scenario: &Scenario, state: &mut SimulationState, year: i32) {
    if !scenario.roth_optimizer.is_active(year) {
        return;
    }

    let taxable = round_cents(federal_taxable_income(
        state.current.income,
        state.current.social_security,
    ));
    let status = state.filing_status();
    let Some(upper) = federal_bracket_containing(taxable, &state.tables, status).and_then(|b| b.to)
    else {
        return;
    };

    let room = upper - taxable;
    if room <= 0.0 {
        return;
    }

    let age = state.age(year);
    let result = withdraw(
        room,
        &scenario.strategies.roth_conversion,
        &mut state.portfolio,
        &mut state.current,
        WithdrawalPolicy::ROTH_CONVERSION,
        age,
    );
    debug!(year, room, converted = result.withdrawn, "Roth conversion");
}
