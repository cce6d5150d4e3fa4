use std::collections::BTreeMap;

use crate::model::{EventKind, InvestmentId, Scenario, TaxStatus};
use crate::simulation_state::{Portfolio, SimulationState};

/// Sweeps cash above each active invest event's threshold into its targets.
pub(crate) fn process(scenario: &Scenario, state: &mut SimulationState, year: i32) {
    for (event, runtime) in scenario.events.iter().zip(&state.events) {
        let EventKind::Invest(invest) = &event.kind else {
            continue;
        };
        let schedule = runtime.schedule;
        if !schedule.is_active(year) {
            continue;
        }

        let excess = state.portfolio.cash().value - invest.max_cash;
        if excess <= 0.0 {
            continue;
        }

        let allocation =
            invest
                .allocation
                .allocation_at(year, schedule.start_year, schedule.duration);
        let purchases = plan_purchases(
            &allocation,
            excess,
            &state.portfolio,
            &mut state.contribution_room,
        );

        let mut spent = 0.0;
        for (idx, amount) in purchases {
            let amount = amount.min(excess - spent);
            if amount <= 0.0 {
                continue;
            }
            state.portfolio.at_mut(idx).buy(amount);
            spent += amount;
        }
        state.portfolio.cash_mut().sell(spent);
    }
}

/// Splits `excess` by allocation. After-tax purchases are capped by the
/// remaining contribution room; the overflow goes to the other targets in
/// proportion to their allocation, or stays in cash if there are none.
fn plan_purchases(
    allocation: &BTreeMap<InvestmentId, f64>,
    excess: f64,
    portfolio: &Portfolio,
    contribution_room: &mut f64,
) -> Vec<(usize, f64)> {
    let mut after_tax = Vec::new();
    let mut other = Vec::new();
    for (id, &share) in allocation {
        let Some(idx) = portfolio.position(id) else {
            continue;
        };
        if share <= 0.0 {
            continue;
        }
        if portfolio.at(idx).tax_status == TaxStatus::AfterTax {
            after_tax.push((idx, share));
        } else {
            other.push((idx, share));
        }
    }

    let after_tax_total: f64 = after_tax.iter().map(|(_, share)| excess * share).sum();
    let scale = if after_tax_total > *contribution_room {
        *contribution_room / after_tax_total
    } else {
        1.0
    };
    let overflow = after_tax_total * (1.0 - scale);
    *contribution_room -= after_tax_total * scale;

    let other_share: f64 = other.iter().map(|(_, share)| share).sum();
    let mut purchases: Vec<(usize, f64)> = after_tax
        .into_iter()
        .map(|(idx, share)| (idx, excess * share * scale))
        .collect();
    purchases.extend(other.into_iter().map(|(idx, share)| {
        let extra = if other_share > 0.0 {
            overflow * share / other_share
        } else {
            0.0
        };
        (idx, excess * share + extra)
    }));
    purchases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Investment;

    fn portfolio() -> Portfolio {
        Portfolio::from_investments(&[
            Investment::new("cash", "cash", TaxStatus::NonRetirement, 0.0),
            Investment::new("roth", "fund", TaxStatus::AfterTax, 0.0),
            Investment::new("taxable", "fund", TaxStatus::NonRetirement, 0.0),
            Investment::new("bonds", "bond", TaxStatus::NonRetirement, 0.0),
        ])
        .unwrap()
    }

    fn allocation(pairs: &[(&str, f64)]) -> BTreeMap<InvestmentId, f64> {
        pairs.iter().map(|(k, v)| (InvestmentId::from(*k), *v)).collect()
    }

    fn amount_for(purchases: &[(usize, f64)], p: &Portfolio, id: &str) -> f64 {
        let idx = p.position(&InvestmentId::from(id)).unwrap();
        purchases
            .iter()
            .filter(|(i, _)| *i == idx)
            .map(|(_, a)| a)
            .sum()
    }

    #[test]
    fn test_under_limit_follows_allocation() {
        let p = portfolio();
        let mut room = 7_000.0;
        let plan = plan_purchases(
            &allocation(&[("roth", 0.5), ("taxable", 0.5)]),
            10_000.0,
            &p,
            &mut room,
        );
        assert!((amount_for(&plan, &p, "roth") - 5_000.0).abs() < 1e-9);
        assert!((amount_for(&plan, &p, "taxable") - 5_000.0).abs() < 1e-9);
        assert!((room - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_overflow_redistributed_proportionally() {
        let p = portfolio();
        let mut room = 2_000.0;
        let plan = plan_purchases(
            &allocation(&[("roth", 0.5), ("taxable", 0.3), ("bonds", 0.2)]),
            10_000.0,
            &p,
            &mut room,
        );
        // 5,000 wanted for roth, capped at 2,000; 3,000 split 3:2
        assert!((amount_for(&plan, &p, "roth") - 2_000.0).abs() < 1e-9);
        assert!((amount_for(&plan, &p, "taxable") - 4_800.0).abs() < 1e-9);
        assert!((amount_for(&plan, &p, "bonds") - 3_200.0).abs() < 1e-9);
        assert!(room.abs() < 1e-9);
        let total: f64 = plan.iter().map(|(_, a)| a).sum();
        assert!((total - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_overflow_without_other_targets_stays_in_cash() {
        let p = portfolio();
        let mut room = 1_000.0;
        let plan = plan_purchases(&allocation(&[("roth", 1.0)]), 4_000.0, &p, &mut room);
        let total: f64 = plan.iter().map(|(_, a)| a).sum();
        assert!((total - 1_000.0).abs() < 1e-9);
    }
}
