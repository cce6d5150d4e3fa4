//! Scenario checks run once before any simulation starts.
//!
//! Every problem is collected so callers can report them together.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{ValidationError, ValidationIssue};
use crate::model::{
    DistributionSpec, EventKind, InvestmentId, Scenario, StartYearSpec, TaxStatus,
};

/// Allowed drift of an allocation's shares from 1
const ALLOCATION_TOLERANCE: f64 = 1e-6;

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    check_household(scenario, &mut issues);
    check_investments(scenario, &mut issues);
    check_events(scenario, &mut issues);
    check_strategies(scenario, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

fn check_distribution(field: &str, spec: &DistributionSpec, issues: &mut Vec<ValidationIssue>) {
    if let Some(reason) = spec.parameter_problem() {
        issues.push(ValidationIssue::InvalidDistribution {
            field: field.to_string(),
            reason,
        });
    }
}

fn check_non_negative(field: &str, value: f64, issues: &mut Vec<ValidationIssue>) {
    if !(value.is_finite() && value >= 0.0) {
        issues.push(ValidationIssue::InvalidValue {
            field: field.to_string(),
            reason: "must be a non-negative number",
        });
    }
}

fn check_household(scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
    check_distribution("life_expectancy", &scenario.life_expectancy, issues);
    check_distribution("inflation", &scenario.inflation, issues);
    check_non_negative(
        "after_tax_contribution_limit",
        scenario.after_tax_contribution_limit,
        issues,
    );
    check_non_negative("financial_goal", scenario.financial_goal, issues);

    if scenario.is_married {
        match (&scenario.spouse_birth_year, &scenario.spouse_life_expectancy) {
            (Some(_), Some(spec)) => check_distribution("spouse_life_expectancy", spec, issues),
            _ => issues.push(ValidationIssue::MissingSpouseData),
        }
    }
}

fn check_investments(scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
    let mut type_ids = FxHashSet::default();
    for ty in &scenario.investment_types {
        if !type_ids.insert(&ty.id) {
            issues.push(ValidationIssue::DuplicateInvestmentType(ty.id.clone()));
        }
        let id = ty.id.as_str();
        check_distribution(
            &format!("{id}.expected_return"),
            &ty.expected_return.distribution,
            issues,
        );
        check_distribution(
            &format!("{id}.expected_income"),
            &ty.expected_income.distribution,
            issues,
        );
        check_non_negative(&format!("{id}.expense_ratio"), ty.expense_ratio, issues);
    }

    let mut ids = FxHashSet::default();
    for inv in &scenario.investments {
        if !ids.insert(&inv.id) {
            issues.push(ValidationIssue::DuplicateInvestment(inv.id.clone()));
        }
        if !type_ids.contains(&inv.investment_type) {
            issues.push(ValidationIssue::UnknownInvestmentType {
                investment: inv.id.clone(),
                investment_type: inv.investment_type.clone(),
            });
        }
        check_non_negative(&format!("{}.value", inv.id), inv.value, issues);
        if let Some(basis) = inv.purchase_price {
            check_non_negative(&format!("{}.purchase_price", inv.id), basis, issues);
        }
    }

    match scenario.investments.iter().find(|i| i.id.is_cash()) {
        None => issues.push(ValidationIssue::MissingCash),
        Some(cash) if cash.tax_status != TaxStatus::NonRetirement => {
            issues.push(ValidationIssue::CashNotNonRetirement);
        }
        Some(_) => {}
    }
}

fn check_events(scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
    let mut names = FxHashSet::default();
    for event in &scenario.events {
        if !names.insert(event.name.as_str()) {
            issues.push(ValidationIssue::DuplicateEventName(event.name.clone()));
        }
    }

    for event in &scenario.events {
        let name = &event.name;
        if let Some(spec) = event.start.distribution() {
            check_distribution(&format!("{name}.start"), &spec, issues);
        }
        check_distribution(&format!("{name}.duration"), &event.duration, issues);

        if let Some(reference) = event.start.referenced_event()
            && !names.contains(reference)
        {
            issues.push(ValidationIssue::UnresolvedEventReference {
                event: name.clone(),
                reference: reference.to_string(),
            });
        }

        if let Some(terms) = event.kind.cash_flow() {
            check_non_negative(&format!("{name}.initial_amount"), terms.initial_amount, issues);
            check_distribution(
                &format!("{name}.expected_change"),
                &terms.expected_change.distribution,
                issues,
            );
            if !(0.0..=1.0).contains(&terms.user_percentage) {
                issues.push(ValidationIssue::InvalidValue {
                    field: format!("{name}.user_percentage"),
                    reason: "must be between 0 and 1",
                });
            }
        }

        if let Some(plan) = event.kind.allocation() {
            if plan.glide_path && plan.target.is_none() {
                issues.push(ValidationIssue::GlidePathWithoutTarget {
                    event: name.clone(),
                });
            }
            for map in std::iter::once(&plan.initial).chain(plan.target.as_ref()) {
                let total: f64 = map.values().sum();
                if (total - 1.0).abs() > ALLOCATION_TOLERANCE {
                    issues.push(ValidationIssue::AllocationNotNormalized {
                        event: name.clone(),
                        total,
                    });
                }
            }
            let mut seen = FxHashSet::default();
            for id in plan.investment_ids() {
                if !seen.insert(id) {
                    continue;
                }
                if id.is_cash() {
                    issues.push(ValidationIssue::CashInAllocation {
                        event: name.clone(),
                    });
                } else if scenario.investment(id.as_str()).is_none() {
                    issues.push(ValidationIssue::UnknownAllocationInvestment {
                        event: name.clone(),
                        investment: id.clone(),
                    });
                }
            }
        }

        if let EventKind::Invest(invest) = &event.kind {
            check_non_negative(&format!("{name}.max_cash"), invest.max_cash, issues);
        }
    }

    check_reference_cycles(scenario, issues);
}

/// Reports every event whose start-year chain loops back on itself.
fn check_reference_cycles(scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
    let references: FxHashMap<&str, &str> = scenario
        .events
        .iter()
        .filter_map(|e| match &e.start {
            StartYearSpec::WithEvent { event } | StartYearSpec::AfterEvent { event } => {
                Some((e.name.as_str(), event.as_str()))
            }
            _ => None,
        })
        .collect();

    for start in scenario.events.iter().map(|e| e.name.as_str()) {
        let mut current = start;
        let mut steps = 0;
        while let Some(&next) = references.get(current) {
            if next == start {
                issues.push(ValidationIssue::EventReferenceCycle {
                    event: start.to_string(),
                });
                break;
            }
            current = next;
            steps += 1;
            // A chain longer than the map has entered a cycle not including `start`
            if steps > references.len() {
                break;
            }
        }
    }
}

fn check_strategies(scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
    let strategies = &scenario.strategies;

    let lists: [(&'static str, &[InvestmentId], bool); 3] = [
        ("expense withdrawal", &strategies.expense_withdrawal, false),
        ("rmd", &strategies.rmd, true),
        ("roth conversion", &strategies.roth_conversion, true),
    ];
    for (strategy, ids, pre_tax_only) in lists {
        for id in ids {
            match scenario.investment(id.as_str()) {
                None => issues.push(ValidationIssue::UnknownStrategyInvestment {
                    strategy,
                    investment: id.clone(),
                }),
                Some(inv) if pre_tax_only && inv.tax_status != TaxStatus::PreTax => {
                    issues.push(ValidationIssue::StrategyRequiresPreTax {
                        strategy,
                        investment: id.clone(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    for name in &strategies.spending {
        match scenario.event(name) {
            None => issues.push(ValidationIssue::UnknownSpendingEvent(name.clone())),
            Some(event) if !event.kind.is_discretionary_expense() => {
                issues.push(ValidationIssue::NotDiscretionary(name.clone()));
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::{EventBuilder, ScenarioBuilder};
    use crate::model::{AllocationPlan, Investment, InvestmentType};

    fn base() -> ScenarioBuilder {
        ScenarioBuilder::new("test", 1980)
            .life_expectancy(DistributionSpec::fixed(90.0))
            .with_cash(1_000.0)
    }

    #[test]
    fn test_minimal_scenario_is_valid() {
        assert!(validate_scenario(&base().build()).is_ok());
    }

    #[test]
    fn test_missing_cash() {
        let mut scenario = base().build();
        scenario.investments.clear();
        let err = validate_scenario(&scenario).unwrap_err();
        assert!(err.issues.contains(&ValidationIssue::MissingCash));
    }

    #[test]
    fn test_unresolved_and_cyclic_references() {
        let scenario = base()
            .event(EventBuilder::income("salary", 50_000.0).starting_with("nowhere").build())
            .event(EventBuilder::expense("a", 10.0).starting_after("b").build())
            .event(EventBuilder::expense("b", 10.0).starting_with("a").build())
            .build();

        let err = validate_scenario(&scenario).unwrap_err();
        assert!(err.issues.contains(&ValidationIssue::UnresolvedEventReference {
            event: "salary".into(),
            reference: "nowhere".into(),
        }));
        assert!(err.issues.contains(&ValidationIssue::EventReferenceCycle { event: "a".into() }));
        assert!(err.issues.contains(&ValidationIssue::EventReferenceCycle { event: "b".into() }));
    }

    #[test]
    fn test_strategy_ids_must_exist() {
        let scenario = base()
            .investment_type(InvestmentType::new("fund"))
            .investment(Investment::new("fund taxable", "fund", TaxStatus::NonRetirement, 10.0))
            .withdrawal_strategy(["fund taxable", "ghost"])
            .rmd_strategy(["fund taxable"])
            .spending_strategy(["vacation"])
            .build();

        let err = validate_scenario(&scenario).unwrap_err();
        assert_eq!(err.issues.len(), 3, "{err}");
        assert!(err.issues.contains(&ValidationIssue::UnknownStrategyInvestment {
            strategy: "expense withdrawal",
            investment: "ghost".into(),
        }));
        assert!(err.issues.contains(&ValidationIssue::StrategyRequiresPreTax {
            strategy: "rmd",
            investment: "fund taxable".into(),
        }));
        assert!(err
            .issues
            .contains(&ValidationIssue::UnknownSpendingEvent("vacation".into())));
    }

    #[test]
    fn test_allocation_checks() {
        let mut glide = AllocationPlan::fixed(BTreeMap::from([(InvestmentId::from("ghost"), 1.0)]));
        glide.glide_path = true;
        let into_cash = AllocationPlan::fixed(BTreeMap::from([(InvestmentId::cash(), 1.0)]));
        let scenario = base()
            .event(EventBuilder::invest("invest", glide).build())
            .event(EventBuilder::rebalance("rebalance", into_cash).build())
            .build();

        let err = validate_scenario(&scenario).unwrap_err();
        assert!(err.issues.contains(&ValidationIssue::GlidePathWithoutTarget {
            event: "invest".into()
        }));
        assert!(err.issues.contains(&ValidationIssue::UnknownAllocationInvestment {
            event: "invest".into(),
            investment: "ghost".into(),
        }));
        assert!(err.issues.contains(&ValidationIssue::CashInAllocation {
            event: "rebalance".into()
        }));
    }

    #[test]
    fn test_invalid_distributions_reported() {
        let mut scenario = base()
            .inflation(DistributionSpec::normal(0.03, -0.01))
            .married(1982, DistributionSpec::fixed(85.0))
            .build();
        scenario.spouse_life_expectancy = None;
        let err = validate_scenario(&scenario).unwrap_err();
        assert!(err.issues.iter().any(|i| matches!(
            i,
            ValidationIssue::InvalidDistribution { field, .. } if field == "inflation"
        )));
        assert!(err.issues.contains(&ValidationIssue::MissingSpouseData));
    }
}
