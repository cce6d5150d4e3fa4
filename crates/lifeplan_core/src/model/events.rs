//! Event series - recurring cash flows and portfolio actions
//!
//! An [`EventSeries`] has a shared header (name, start, duration) and one of
//! four payloads selected by its `type` tag: income, expense, invest or
//! rebalance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::distribution::{ChangeSpec, DistributionSpec};
use super::ids::InvestmentId;

/// When an event series begins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StartYearSpec {
    Fixed { year: i32 },
    Normal { mean: f64, std_dev: f64 },
    Uniform { lower: f64, upper: f64 },
    /// Same start year as the named event
    WithEvent { event: String },
    /// The year after the named event ends
    AfterEvent { event: String },
}

impl StartYearSpec {
    /// Name of the event this start depends on
    #[must_use]
    pub fn referenced_event(&self) -> Option<&str> {
        match self {
            StartYearSpec::WithEvent { event } | StartYearSpec::AfterEvent { event } => {
                Some(event)
            }
            _ => None,
        }
    }

    /// The sampled part of the spec, for the stochastic kinds
    #[must_use]
    pub fn distribution(&self) -> Option<DistributionSpec> {
        match *self {
            StartYearSpec::Fixed { year } => Some(DistributionSpec::fixed(f64::from(year))),
            StartYearSpec::Normal { mean, std_dev } => {
                Some(DistributionSpec::normal(mean, std_dev))
            }
            StartYearSpec::Uniform { lower, upper } => Some(DistributionSpec::uniform(lower, upper)),
            StartYearSpec::WithEvent { .. } | StartYearSpec::AfterEvent { .. } => None,
        }
    }
}

fn full_share() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeEvent {
    pub initial_amount: f64,
    #[serde(default = "ChangeSpec::none")]
    pub expected_change: ChangeSpec,
    #[serde(default)]
    pub inflation_adjusted: bool,
    /// Share attributable to the primary account holder
    #[serde(default = "full_share")]
    pub user_percentage: f64,
    #[serde(default)]
    pub social_security: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEvent {
    pub initial_amount: f64,
    #[serde(default = "ChangeSpec::none")]
    pub expected_change: ChangeSpec,
    #[serde(default)]
    pub inflation_adjusted: bool,
    /// Share attributable to the primary account holder
    #[serde(default = "full_share")]
    pub user_percentage: f64,
    #[serde(default)]
    pub discretionary: bool,
}

/// Target allocation, optionally gliding from `initial` to `target`
/// over the event's active window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub initial: BTreeMap<InvestmentId, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BTreeMap<InvestmentId, f64>>,
    #[serde(default)]
    pub glide_path: bool,
}

impl AllocationPlan {
    #[must_use]
    pub fn fixed(initial: BTreeMap<InvestmentId, f64>) -> Self {
        Self {
            initial,
            target: None,
            glide_path: false,
        }
    }

    #[must_use]
    pub fn glide(initial: BTreeMap<InvestmentId, f64>, target: BTreeMap<InvestmentId, f64>) -> Self {
        Self {
            initial,
            target: Some(target),
            glide_path: true,
        }
    }

    /// Every holding named by either allocation map
    pub fn investment_ids(&self) -> impl Iterator<Item = &InvestmentId> {
        self.initial
            .keys()
            .chain(self.target.iter().flat_map(BTreeMap::keys))
    }

    /// Allocation percentages in effect for `year`.
    ///
    /// With a glide path the result is interpolated linearly between the two
    /// maps over `[start_year, start_year + duration)`. Holdings missing from
    /// one map count as 0% there.
    #[must_use]
    pub fn allocation_at(&self, year: i32, start_year: i32, duration: i32) -> BTreeMap<InvestmentId, f64> {
        let target = match (&self.target, self.glide_path) {
            (Some(target), true) if duration > 0 => target,
            _ => return self.initial.clone(),
        };

        let progress = (f64::from(year - start_year) / f64::from(duration)).clamp(0.0, 1.0);
        self.investment_ids()
            .map(|id| {
                let from = self.initial.get(id).copied().unwrap_or(0.0);
                let to = target.get(id).copied().unwrap_or(0.0);
                (id.clone(), from + (to - from) * progress)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestEvent {
    pub allocation: AllocationPlan,
    /// Cash kept on hand; anything above it is invested
    #[serde(default)]
    pub max_cash: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceEvent {
    pub allocation: AllocationPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Income(IncomeEvent),
    Expense(ExpenseEvent),
    Invest(InvestEvent),
    Rebalance(RebalanceEvent),
}

/// Income/expense terms shared by both cash-flow kinds
#[derive(Debug, Clone, Copy)]
pub struct CashFlowTerms<'a> {
    pub initial_amount: f64,
    pub expected_change: &'a ChangeSpec,
    pub inflation_adjusted: bool,
    pub user_percentage: f64,
}

impl EventKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Income(_) => "income",
            EventKind::Expense(_) => "expense",
            EventKind::Invest(_) => "invest",
            EventKind::Rebalance(_) => "rebalance",
        }
    }

    #[must_use]
    pub fn cash_flow(&self) -> Option<CashFlowTerms<'_>> {
        match self {
            EventKind::Income(income) => Some(CashFlowTerms {
                initial_amount: income.initial_amount,
                expected_change: &income.expected_change,
                inflation_adjusted: income.inflation_adjusted,
                user_percentage: income.user_percentage,
            }),
            EventKind::Expense(expense) => Some(CashFlowTerms {
                initial_amount: expense.initial_amount,
                expected_change: &expense.expected_change,
                inflation_adjusted: expense.inflation_adjusted,
                user_percentage: expense.user_percentage,
            }),
            EventKind::Invest(_) | EventKind::Rebalance(_) => None,
        }
    }

    #[must_use]
    pub fn allocation(&self) -> Option<&AllocationPlan> {
        match self {
            EventKind::Invest(invest) => Some(&invest.allocation),
            EventKind::Rebalance(rebalance) => Some(&rebalance.allocation),
            EventKind::Income(_) | EventKind::Expense(_) => None,
        }
    }

    #[must_use]
    pub fn is_discretionary_expense(&self) -> bool {
        matches!(self, EventKind::Expense(e) if e.discretionary)
    }
}

/// A recurring event over a span of years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSeries {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub start: StartYearSpec,
    /// Number of active years; zero or less means open-ended
    #[serde(default)]
    pub duration: DistributionSpec,
    pub kind: EventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alloc(pairs: &[(&str, f64)]) -> BTreeMap<InvestmentId, f64> {
        pairs.iter().map(|(k, v)| (InvestmentId::from(*k), *v)).collect()
    }

    #[test]
    fn test_static_allocation_ignores_year() {
        let plan = AllocationPlan::fixed(alloc(&[("stocks", 0.6), ("bonds", 0.4)]));
        assert_eq!(plan.allocation_at(2030, 2025, 10), plan.initial);
        assert_eq!(plan.allocation_at(2060, 2025, 10), plan.initial);
    }

    #[test]
    fn test_glide_path_interpolates() {
        let plan = AllocationPlan::glide(
            alloc(&[("stocks", 0.9), ("bonds", 0.1)]),
            alloc(&[("stocks", 0.5), ("bonds", 0.5)]),
        );
        let start = plan.allocation_at(2025, 2025, 10);
        assert!((start[&InvestmentId::from("stocks")] - 0.9).abs() < 1e-12);

        let mid = plan.allocation_at(2030, 2025, 10);
        assert!((mid[&InvestmentId::from("stocks")] - 0.7).abs() < 1e-12);
        assert!((mid[&InvestmentId::from("bonds")] - 0.3).abs() < 1e-12);

        let past_end = plan.allocation_at(2040, 2025, 10);
        assert!((past_end[&InvestmentId::from("stocks")] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_glide_path_union_of_keys() {
        let plan = AllocationPlan::glide(alloc(&[("a", 1.0)]), alloc(&[("b", 1.0)]));
        let mid = plan.allocation_at(2027, 2025, 4);
        assert!((mid[&InvestmentId::from("a")] - 0.5).abs() < 1e-12);
        assert!((mid[&InvestmentId::from("b")] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_glide_path_without_duration_is_static() {
        let plan = AllocationPlan::glide(alloc(&[("a", 1.0)]), alloc(&[("b", 1.0)]));
        assert_eq!(plan.allocation_at(2030, 2025, 0), plan.initial);
    }
}
