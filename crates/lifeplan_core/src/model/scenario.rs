//! Household scenario - the immutable input snapshot of a run

use serde::{Deserialize, Serialize};

use super::accounts::{Investment, InvestmentType};
use super::distribution::DistributionSpec;
use super::events::EventSeries;
use super::ids::InvestmentId;

/// Bracket partition selected by the household's marital state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
}

impl FilingStatus {
    #[must_use]
    pub fn for_household(is_married: bool) -> Self {
        if is_married {
            FilingStatus::MarriedFilingJointly
        } else {
            FilingStatus::Single
        }
    }
}

/// Ordered priority lists that drive liquidation and spending
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategies {
    /// Discretionary expense event names, highest priority first
    pub spending: Vec<String>,
    /// Holdings liquidated to pay expenses and taxes
    pub expense_withdrawal: Vec<InvestmentId>,
    /// Pre-tax holdings drained for required distributions
    pub rmd: Vec<InvestmentId>,
    /// Pre-tax holdings drained for Roth conversions
    pub roth_conversion: Vec<InvestmentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RothOptimizer {
    pub enabled: bool,
    pub start_year: i32,
    pub end_year: i32,
}

impl RothOptimizer {
    #[must_use]
    pub fn is_active(&self, year: i32) -> bool {
        self.enabled && (self.start_year..=self.end_year).contains(&year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub is_married: bool,
    pub birth_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse_birth_year: Option<i32>,
    /// Age at death, in years
    pub life_expectancy: DistributionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse_life_expectancy: Option<DistributionSpec>,
    /// Yearly inflation rate
    #[serde(default)]
    pub inflation: DistributionSpec,
    #[serde(default)]
    pub after_tax_contribution_limit: f64,
    /// Two-letter state code; `None` means no state income tax
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_of_residence: Option<String>,
    /// Asset floor that discretionary spending may not breach
    #[serde(default)]
    pub financial_goal: f64,
    #[serde(default)]
    pub roth_optimizer: RothOptimizer,
    #[serde(default)]
    pub strategies: Strategies,
    pub investment_types: Vec<InvestmentType>,
    pub investments: Vec<Investment>,
    #[serde(default)]
    pub events: Vec<EventSeries>,
}

impl Scenario {
    #[must_use]
    pub fn event(&self, name: &str) -> Option<&EventSeries> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn event_mut(&mut self, name: &str) -> Option<&mut EventSeries> {
        self.events.iter_mut().find(|e| e.name == name)
    }

    #[must_use]
    pub fn investment(&self, id: &str) -> Option<&Investment> {
        self.investments.iter().find(|i| i.id.as_str() == id)
    }
}
