use tracing::debug;

use crate::liquidation::pay_from_cash_then;
use crate::model::{EventKind, Scenario};
use crate::simulation_state::{SimulationState, round_cents};
use crate::taxes::{TaxBill, settle_prior_year};

use super::{Shortfall, take_amount};

fn floor_cents(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// Pays last year's taxes and this year's non-discretionary expenses.
///
/// Fails when total assets cannot cover the bill, or when cash plus the
/// withdrawal strategy leave part of it unpaid.
pub(crate) fn settle_non_discretionary(
    scenario: &Scenario,
    state: &mut SimulationState,
    year: i32,
) -> Result<(), Shortfall> {
    let taxes = if year > state.start_year {
        settle_prior_year(&state.previous, &state.tables, state.filing_status()).rounded()
    } else {
        TaxBill::default()
    };

    let mut expenses = 0.0;
    for (event, runtime) in scenario.events.iter().zip(state.events.iter_mut()) {
        let EventKind::Expense(expense) = &event.kind else {
            continue;
        };
        if expense.discretionary || !runtime.schedule.is_active(year) {
            continue;
        }
        expenses += take_amount(
            runtime,
            expense.initial_amount,
            &expense.expected_change,
            &mut state.rng,
        );
    }

    let total = round_cents(expenses + taxes.total());
    state.totals.taxes = taxes;

    let assets = state.portfolio.total_value();
    if assets < total {
        return Err(Shortfall(round_cents(total - assets)));
    }
    state.totals.expenses = total;

    let age = state.age(year);
    let unpaid = pay_from_cash_then(
        total,
        &scenario.strategies.expense_withdrawal,
        &mut state.portfolio,
        &mut state.current,
        age,
    );
    if unpaid >= 0.01 {
        return Err(Shortfall(round_cents(unpaid)));
    }
    Ok(())
}

/// Funds the discretionary expenses named in the spending strategy as one
/// pool, never drawing total assets below the financial goal.
pub(crate) fn fund_discretionary(scenario: &Scenario, state: &mut SimulationState, year: i32) {
    let mut requested = 0.0;
    let mut counted: Vec<usize> = Vec::new();
    for name in &scenario.strategies.spending {
        let Some(&idx) = state.event_index.get(name) else {
            continue;
        };
        if counted.contains(&idx) {
            continue;
        }
        let EventKind::Expense(expense) = &scenario.events[idx].kind else {
            continue;
        };
        let runtime = &mut state.events[idx];
        if !expense.discretionary || !runtime.schedule.is_active(year) {
            continue;
        }
        counted.push(idx);
        requested += take_amount(
            runtime,
            expense.initial_amount,
            &expense.expected_change,
            &mut state.rng,
        );
    }

    if requested <= 0.0 {
        state.totals.discretionary_paid_fraction = 1.0;
        return;
    }

    let spendable = (state.portfolio.total_value() - scenario.financial_goal).max(0.0);
    let affordable = floor_cents(requested.min(spendable));
    let age = state.age(year);
    let unpaid = if affordable > 0.0 {
        pay_from_cash_then(
            affordable,
            &scenario.strategies.expense_withdrawal,
            &mut state.portfolio,
            &mut state.current,
            age,
        )
    } else {
        0.0
    };

    let paid = affordable - unpaid;
    state.totals.expenses = round_cents(state.totals.expenses + paid);
    state.totals.discretionary_paid_fraction = paid / requested;
    debug!(year, requested, paid, "Discretionary spending");
}
