use crate::model::{EventKind, Scenario, TaxStatus};
use crate::simulation_state::SimulationState;

/// Moves each active rebalance event's holdings to their target shares.
///
/// Over-allocated holdings are sold into cash first, then under-allocated
/// holdings are bought from cash.
pub(crate) fn process(scenario: &Scenario, state: &mut SimulationState, year: i32) {
    let portfolio = &mut state.portfolio;

    for (event, runtime) in scenario.events.iter().zip(&state.events) {
        let EventKind::Rebalance(rebalance) = &event.kind else {
            continue;
        };
        let schedule = runtime.schedule;
        if !schedule.is_active(year) {
            continue;
        }

        let allocation =
            rebalance
                .allocation
                .allocation_at(year, schedule.start_year, schedule.duration);
        let members: Vec<(usize, f64)> = allocation
            .iter()
            .filter_map(|(id, &share)| portfolio.position(id).map(|idx| (idx, share)))
            .collect();

        let total: f64 = members.iter().map(|&(idx, _)| portfolio.at(idx).value).sum();
        if total <= 0.0 {
            continue;
        }

        let adjustments: Vec<(usize, f64)> = members
            .iter()
            .map(|&(idx, share)| (idx, total * share - portfolio.at(idx).value))
            .collect();

        for &(idx, adjustment) in &adjustments {
            if adjustment >= 0.0 {
                continue;
            }
            let holding = portfolio.at_mut(idx);
            let sale = holding.sell(-adjustment);
            if holding.tax_status == TaxStatus::NonRetirement {
                state.current.capital_gains += sale.gain;
            }
            portfolio.cash_mut().buy(sale.amount);
        }

        for &(idx, adjustment) in &adjustments {
            if adjustment <= 0.0 {
                continue;
            }
            let amount = adjustment.min(portfolio.cash().value);
            if amount <= 0.0 {
                continue;
            }
            portfolio.at_mut(idx).buy(amount);
            portfolio.cash_mut().sell(amount);
        }
    }
}
