//! Bracket tables and their yearly inflation indexing

use serde::{Deserialize, Serialize};

use super::scenario::FilingStatus;

/// One band of a progressive schedule (federal income or capital gains)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub rate: f64,
    pub from: f64,
    /// Upper threshold; `None` is unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
    /// Partition this band belongs to; `None` applies to every status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_status: Option<FilingStatus>,
}

impl Bracket {
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.to.unwrap_or(f64::INFINITY)
    }

    #[must_use]
    pub fn applies_to(&self, status: FilingStatus) -> bool {
        self.filing_status.is_none_or(|s| s == status)
    }

    fn indexed(&self, factor: f64) -> Self {
        Self {
            from: index_threshold(self.from, factor),
            to: self.to.map(|to| index_threshold(to, factor)),
            ..*self
        }
    }
}

/// State band: `base_tax + (income - from) * rate` for `from < income <= to`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateBracket {
    pub rate: f64,
    pub from: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
    #[serde(default)]
    pub base_tax: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_status: Option<FilingStatus>,
}

impl StateBracket {
    #[must_use]
    pub fn applies_to(&self, status: FilingStatus) -> bool {
        self.filing_status.is_none_or(|s| s == status)
    }

    #[must_use]
    pub fn contains(&self, income: f64) -> bool {
        income > self.from && self.to.is_none_or(|to| income <= to)
    }

    fn indexed(&self, factor: f64) -> Self {
        Self {
            from: index_threshold(self.from, factor),
            to: self.to.map(|to| index_threshold(to, factor)),
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardDeduction {
    pub filing_status: FilingStatus,
    pub amount: f64,
}

fn index_threshold(value: f64, factor: f64) -> f64 {
    (value * factor).round()
}

/// The four bracket tables in effect for one simulated year
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxTables {
    pub federal: Vec<Bracket>,
    /// Empty for states without an income tax
    #[serde(default)]
    pub state: Vec<StateBracket>,
    pub capital_gains: Vec<Bracket>,
    pub standard_deductions: Vec<StandardDeduction>,
}

impl TaxTables {
    /// Thresholds and deductions scaled by `1 + inflation_rate` and rounded to
    /// whole units. Rates, base taxes and unbounded tops are unchanged.
    #[must_use]
    pub fn reindexed(&self, inflation_rate: f64) -> Self {
        let factor = 1.0 + inflation_rate;
        Self {
            federal: self.federal.iter().map(|b| b.indexed(factor)).collect(),
            state: self.state.iter().map(|b| b.indexed(factor)).collect(),
            capital_gains: self.capital_gains.iter().map(|b| b.indexed(factor)).collect(),
            standard_deductions: self
                .standard_deductions
                .iter()
                .map(|d| StandardDeduction {
                    filing_status: d.filing_status,
                    amount: index_threshold(d.amount, factor),
                })
                .collect(),
        }
    }

    pub fn federal_for(&self, status: FilingStatus) -> impl Iterator<Item = &Bracket> {
        self.federal.iter().filter(move |b| b.applies_to(status))
    }

    pub fn capital_gains_for(&self, status: FilingStatus) -> impl Iterator<Item = &Bracket> {
        self.capital_gains.iter().filter(move |b| b.applies_to(status))
    }

    pub fn state_for(&self, status: FilingStatus) -> impl Iterator<Item = &StateBracket> {
        self.state.iter().filter(move |b| b.applies_to(status))
    }

    #[must_use]
    pub fn standard_deduction(&self, status: FilingStatus) -> f64 {
        self.standard_deductions
            .iter()
            .find(|d| d.filing_status == status)
            .map_or(0.0, |d| d.amount)
    }
}
