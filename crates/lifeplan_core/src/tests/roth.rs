//! Roth conversion tests
//!
//! Conversions fill the federal bracket containing the year's taxable income
//! (no standard deduction) with pre-tax balance.

use super::{START, assert_close, fund, run};
use crate::config::{EventBuilder, ScenarioBuilder};
use crate::model::{DistributionSpec, Investment, TaxStatus};

fn converter(income: f64) -> ScenarioBuilder {
    ScenarioBuilder::new("Converter", 1980)
        .life_expectancy(DistributionSpec::fixed(85.0))
        .with_cash(0.0)
        .investment_type(fund("fund"))
        .investment(Investment::new("ira pre-tax", "fund", TaxStatus::PreTax, 200_000.0))
        .roth_strategy(["ira pre-tax"])
        .roth_optimizer(START, START)
        .event(EventBuilder::income("Salary", income).starting(START).build())
}

#[test]
fn test_fills_current_bracket() {
    let outcome = run(&converter(50_000.0).build());
    let first = &outcome.records[0];
    // 22% band ends at 100,525
    assert_close(first.investment("ira after-tax").unwrap().value, 50_525.0);
    assert_close(first.investment("ira pre-tax").unwrap().value, 149_475.0);
    assert_close(first.total_income, 100_525.0);
}

#[test]
fn test_conversion_taxed_next_year() {
    let outcome = run(&converter(50_000.0).build());
    // 100,525 - 14,600 = 85,925: 1,160 + 4,266 + 38,775 * 22%
    assert_close(outcome.records[1].federal_tax, 13_956.5);
}

#[test]
fn test_only_inside_window() {
    let outcome = run(&converter(50_000.0).build());
    let second = &outcome.records[1];
    assert_close(second.investment("ira after-tax").unwrap().value, 50_525.0);
    assert_close(second.total_income, 50_000.0);
}

#[test]
fn test_bracket_lower_bound_inclusive() {
    let outcome = run(&converter(47_150.0).build());
    assert_close(
        outcome.records[0].investment("ira after-tax").unwrap().value,
        53_375.0,
    );
}

#[test]
fn test_top_bracket_skipped() {
    let outcome = run(&converter(700_000.0).build());
    let first = &outcome.records[0];
    assert!(first.investment("ira after-tax").is_none());
    assert_close(first.investment("ira pre-tax").unwrap().value, 200_000.0);
}

#[test]
fn test_social_security_share_excluded() {
    let scenario = ScenarioBuilder::new("Converter", 1955)
        .life_expectancy(DistributionSpec::fixed(85.0))
        .with_cash(0.0)
        .investment_type(fund("fund"))
        .investment(Investment::new("ira pre-tax", "fund", TaxStatus::PreTax, 200_000.0))
        .roth_strategy(["ira pre-tax"])
        .roth_optimizer(START, START)
        .event(
            EventBuilder::income("Social Security", 40_000.0)
                .starting(START)
                .social_security()
                .build(),
        )
        .build();
    let outcome = run(&scenario);
    // 34,000 taxable sits in the 12% band ending at 47,150
    assert_close(
        outcome.records[0].investment("ira after-tax").unwrap().value,
        13_150.0,
    );
}

#[test]
fn test_disabled_optimizer() {
    let mut scenario = converter(50_000.0).build();
    scenario.roth_optimizer.enabled = false;
    let outcome = run(&scenario);
    assert!(outcome.records[0].investment("ira after-tax").is_none());
}
