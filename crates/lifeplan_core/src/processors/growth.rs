use crate::model::{Scenario, TaxStatus};
use crate::simulation_state::SimulationState;

/// Applies each holding's sampled income, return and expense-ratio charge.
///
/// Income is reinvested into the holding. It counts as taxable income only
/// for non-retirement holdings of a taxable type. Fees are charged on the
/// average of the start and end values.
pub(crate) fn process(scenario: &Scenario, state: &mut SimulationState) {
    for holding in state.portfolio.holdings_mut() {
        if holding.value <= 0.0 {
            continue;
        }
        let Some(&type_idx) = state.investment_types.get(&holding.investment_type) else {
            continue;
        };
        let investment_type = &scenario.investment_types[type_idx];

        let start = holding.value;
        let income = investment_type
            .expected_income
            .delta_on(start, &mut state.rng);
        if holding.tax_status == TaxStatus::NonRetirement && investment_type.taxable {
            state.current.income += income;
        }

        let change = investment_type
            .expected_return
            .delta_on(holding.value, &mut state.rng);
        holding.value += change + income;

        let fees = (start + holding.value) / 2.0 * investment_type.expense_ratio;
        holding.value = (holding.value - fees).max(0.0);
    }
}
