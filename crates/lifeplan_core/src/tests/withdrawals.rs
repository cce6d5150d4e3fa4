//! Expense funding tests
//!
//! Non-discretionary expenses and taxes are paid from cash, then the
//! withdrawal strategy. Discretionary spending never takes total assets
//! below the financial goal.

use super::{START, assert_close, fund, run};
use crate::config::{EventBuilder, ScenarioBuilder};
use crate::model::{DistributionSpec, Investment, RunStatus, TaxStatus};

fn household(cash: f64) -> ScenarioBuilder {
    ScenarioBuilder::new("Household", 1970)
        .life_expectancy(DistributionSpec::fixed(90.0))
        .with_cash(cash)
        .investment_type(fund("fund"))
}

#[test]
fn test_cash_first_then_strategy_order() {
    let scenario = household(1_000.0)
        .investment(
            Investment::new("brokerage", "fund", TaxStatus::NonRetirement, 5_000.0)
                .with_purchase_price(4_000.0),
        )
        .investment(Investment::new("ira", "fund", TaxStatus::PreTax, 5_000.0))
        .withdrawal_strategy(["brokerage", "ira"])
        .event(
            EventBuilder::expense("Car", 3_000.0)
                .starting(START)
                .lasting(1.0)
                .build(),
        )
        .build();
    let outcome = run(&scenario);
    let first = &outcome.records[0];
    assert_eq!(first.investment("cash").unwrap().value, 0.0);
    assert_close(first.investment("brokerage").unwrap().value, 3_000.0);
    // 2,000 sold with 1,600 of basis
    assert_close(first.investment("brokerage").unwrap().purchase_price.unwrap(), 2_400.0);
    assert_close(first.investment("ira").unwrap().value, 5_000.0);
    assert_close(first.total_expenses, 3_000.0);
    assert_eq!(first.total_income, 0.0);
}

#[test]
fn test_insolvent_when_assets_short() {
    let scenario = household(1_000.0)
        .event(EventBuilder::expense("Rent", 5_000.0).starting(START).build())
        .build();
    let outcome = run(&scenario);
    assert_eq!(
        outcome.status,
        RunStatus::Insolvent {
            year: START,
            shortfall: 4_000.0
        }
    );
    assert!(outcome.records.is_empty());
    assert!(!outcome.is_success());
}

#[test]
fn test_insolvent_when_strategy_exhausted() {
    let scenario = household(1_000.0)
        .investment(Investment::new("ira", "fund", TaxStatus::PreTax, 10_000.0))
        .event(EventBuilder::expense("Rent", 5_000.0).starting(START).build())
        .build();
    let outcome = run(&scenario);
    assert_eq!(
        outcome.status,
        RunStatus::Insolvent {
            year: START,
            shortfall: 4_000.0
        }
    );
}

#[test]
fn test_insolvency_keeps_completed_years() {
    let scenario = household(12_000.0)
        .event(EventBuilder::expense("Rent", 5_000.0).starting(START).build())
        .build();
    let outcome = run(&scenario);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(
        outcome.status,
        RunStatus::Insolvent {
            year: START + 2,
            shortfall: 3_000.0
        }
    );
}

#[test]
fn test_discretionary_respects_goal() {
    let scenario = household(50_000.0)
        .financial_goal(45_000.0)
        .event(
            EventBuilder::expense("Travel", 10_000.0)
                .starting(START)
                .discretionary()
                .build(),
        )
        .spending_strategy(["Travel"])
        .build();
    let outcome = run(&scenario);

    let first = &outcome.records[0];
    assert_close(first.total_expenses, 5_000.0);
    assert_close(first.discretionary_paid_fraction, 0.5);
    assert_close(first.total_assets(), 45_000.0);

    let second = &outcome.records[1];
    assert_eq!(second.total_expenses, 0.0);
    assert_eq!(second.discretionary_paid_fraction, 0.0);
    assert_close(second.total_assets(), 45_000.0);
}

#[test]
fn test_discretionary_pool_across_events() {
    let scenario = household(5_000.0)
        .event(
            EventBuilder::expense("Dining", 3_000.0)
                .starting(START)
                .discretionary()
                .build(),
        )
        .event(
            EventBuilder::expense("Travel", 4_000.0)
                .starting(START)
                .discretionary()
                .build(),
        )
        .spending_strategy(["Travel", "Dining"])
        .build();
    let outcome = run(&scenario);
    let first = &outcome.records[0];
    assert_close(first.total_expenses, 5_000.0);
    assert_close(first.discretionary_paid_fraction, 5.0 / 7.0);
}

#[test]
fn test_unlisted_discretionary_is_not_paid() {
    let scenario = household(5_000.0)
        .event(
            EventBuilder::expense("Travel", 4_000.0)
                .starting(START)
                .discretionary()
                .build(),
        )
        .build();
    let outcome = run(&scenario);
    let first = &outcome.records[0];
    assert_eq!(first.total_expenses, 0.0);
    assert_eq!(first.discretionary_paid_fraction, 1.0);
}

#[test]
fn test_discretionary_never_causes_insolvency() {
    let scenario = household(100.0)
        .event(
            EventBuilder::expense("Travel", 4_000.0)
                .starting(START)
                .discretionary()
                .build(),
        )
        .spending_strategy(["Travel"])
        .build();
    let outcome = run(&scenario);
    assert_eq!(outcome.status, RunStatus::Completed);
    assert_close(outcome.records[0].discretionary_paid_fraction, 100.0 / 4_000.0);
}
