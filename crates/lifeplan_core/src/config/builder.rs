//! Scenario Builder
//!
//! Fluent construction of [`Scenario`] values, mainly for tests and
//! benchmarks. Nothing is checked here; run
//! [`validate_scenario`](crate::validation::validate_scenario) (or any
//! simulation entry point) to find problems.

use crate::model::{
    DistributionSpec, EventSeries, Investment, InvestmentId, InvestmentType, RothOptimizer,
    Scenario, Strategies, TaxStatus, CASH_ID,
};

/// Builder for [`Scenario`]
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    scenario: Scenario,
}

impl ScenarioBuilder {
    /// Single household member with a fixed 90-year life expectancy, no
    /// inflation and no holdings.
    #[must_use]
    pub fn new(name: impl Into<String>, birth_year: i32) -> Self {
        Self {
            scenario: Scenario {
                name: name.into(),
                is_married: false,
                birth_year,
                spouse_birth_year: None,
                life_expectancy: DistributionSpec::fixed(90.0),
                spouse_life_expectancy: None,
                inflation: DistributionSpec::fixed(0.0),
                after_tax_contribution_limit: 0.0,
                state_of_residence: None,
                financial_goal: 0.0,
                roth_optimizer: RothOptimizer::default(),
                strategies: Strategies::default(),
                investment_types: Vec::new(),
                investments: Vec::new(),
                events: Vec::new(),
            },
        }
    }

    // =========================================================================
    // Household
    // =========================================================================

    #[must_use]
    pub fn life_expectancy(mut self, spec: DistributionSpec) -> Self {
        self.scenario.life_expectancy = spec;
        self
    }

    #[must_use]
    pub fn married(mut self, spouse_birth_year: i32, spouse_life_expectancy: DistributionSpec) -> Self {
        self.scenario.is_married = true;
        self.scenario.spouse_birth_year = Some(spouse_birth_year);
        self.scenario.spouse_life_expectancy = Some(spouse_life_expectancy);
        self
    }

    #[must_use]
    pub fn inflation(mut self, spec: DistributionSpec) -> Self {
        self.scenario.inflation = spec;
        self
    }

    #[must_use]
    pub fn contribution_limit(mut self, limit: f64) -> Self {
        self.scenario.after_tax_contribution_limit = limit;
        self
    }

    #[must_use]
    pub fn state(mut self, code: impl Into<String>) -> Self {
        self.scenario.state_of_residence = Some(code.into());
        self
    }

    #[must_use]
    pub fn financial_goal(mut self, goal: f64) -> Self {
        self.scenario.financial_goal = goal;
        self
    }

    /// Enable Roth conversions for the inclusive year range
    #[must_use]
    pub fn roth_optimizer(mut self, start_year: i32, end_year: i32) -> Self {
        self.scenario.roth_optimizer = RothOptimizer {
            enabled: true,
            start_year,
            end_year,
        };
        self
    }

    // =========================================================================
    // Holdings
    // =========================================================================

    #[must_use]
    pub fn investment_type(mut self, investment_type: InvestmentType) -> Self {
        self.scenario.investment_types.push(investment_type);
        self
    }

    #[must_use]
    pub fn investment(mut self, investment: Investment) -> Self {
        self.scenario.investments.push(investment);
        self
    }

    /// Add the cash holding (and its type, if missing)
    #[must_use]
    pub fn with_cash(mut self, value: f64) -> Self {
        if !self
            .scenario
            .investment_types
            .iter()
            .any(|t| t.id.as_str() == CASH_ID)
        {
            let mut cash_type = InvestmentType::new(CASH_ID);
            cash_type.taxable = false;
            self.scenario.investment_types.push(cash_type);
        }
        self.scenario.investments.push(Investment::new(
            CASH_ID,
            CASH_ID,
            TaxStatus::NonRetirement,
            value,
        ));
        self
    }

    // =========================================================================
    // Events and strategies
    // =========================================================================

    #[must_use]
    pub fn event(mut self, event: EventSeries) -> Self {
        self.scenario.events.push(event);
        self
    }

    #[must_use]
    pub fn spending_strategy<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scenario.strategies.spending = events.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn withdrawal_strategy<I, S>(mut self, investments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scenario.strategies.expense_withdrawal = ids(investments);
        self
    }

    #[must_use]
    pub fn rmd_strategy<I, S>(mut self, investments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scenario.strategies.rmd = ids(investments);
        self
    }

    #[must_use]
    pub fn roth_strategy<I, S>(mut self, investments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scenario.strategies.roth_conversion = ids(investments);
        self
    }

    #[must_use]
    pub fn build(self) -> Scenario {
        self.scenario
    }
}

fn ids<I, S>(investments: I) -> Vec<InvestmentId>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    investments.into_iter().map(InvestmentId::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_cash_adds_type_once() {
        let scenario = ScenarioBuilder::new("s", 1990)
            .with_cash(100.0)
            .with_cash(50.0)
            .build();
        assert_eq!(scenario.investment_types.len(), 1);
        assert!(!scenario.investment_types[0].taxable);
        assert_eq!(scenario.investments.len(), 2);
    }

    #[test]
    fn test_married_sets_spouse_fields() {
        let scenario = ScenarioBuilder::new("s", 1990)
            .married(1992, DistributionSpec::fixed(88.0))
            .build();
        assert!(scenario.is_married);
        assert_eq!(scenario.spouse_birth_year, Some(1992));
        assert_eq!(scenario.spouse_life_expectancy, Some(DistributionSpec::fixed(88.0)));
    }
}
