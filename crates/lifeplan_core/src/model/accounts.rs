//! Investment types and holdings
//!
//! An [`InvestmentType`] describes how a class of asset behaves (return,
//! income yield, expense ratio, taxability). An [`Investment`] is a concrete
//! holding of one type under one tax treatment.

use serde::{Deserialize, Serialize};

use super::distribution::ChangeSpec;
use super::ids::{InvestmentId, InvestmentTypeId};

/// Tax treatment of a holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxStatus {
    /// Regular brokerage and cash - realized gains are taxed
    NonRetirement,
    /// 401k, Traditional IRA - withdrawals taxed as income
    PreTax,
    /// Roth IRA, Roth 401k - withdrawals tax-free
    AfterTax,
}

impl TaxStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TaxStatus::NonRetirement => "non-retirement",
            TaxStatus::PreTax => "pre-tax",
            TaxStatus::AfterTax => "after-tax",
        }
    }

    /// Retirement holdings are subject to the early-withdrawal penalty
    #[must_use]
    pub fn is_retirement(self) -> bool {
        matches!(self, TaxStatus::PreTax | TaxStatus::AfterTax)
    }
}

/// Return and income model shared by every holding of this type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentType {
    pub id: InvestmentTypeId,
    #[serde(default)]
    pub description: String,
    /// Yearly change in value
    #[serde(default = "ChangeSpec::none")]
    pub expected_return: ChangeSpec,
    /// Yearly income (dividends, interest), reinvested into the holding
    #[serde(default = "ChangeSpec::none")]
    pub expected_income: ChangeSpec,
    /// Fraction of the average yearly value charged as fees
    #[serde(default)]
    pub expense_ratio: f64,
    /// Whether income from non-retirement holdings is taxable
    #[serde(default = "default_true")]
    pub taxable: bool,
}

fn default_true() -> bool {
    true
}

impl InvestmentType {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: InvestmentTypeId::new(id),
            description: String::new(),
            expected_return: ChangeSpec::none(),
            expected_income: ChangeSpec::none(),
            expense_ratio: 0.0,
            taxable: true,
        }
    }
}

/// A holding as supplied in a scenario snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: InvestmentId,
    pub investment_type: InvestmentTypeId,
    pub tax_status: TaxStatus,
    pub value: f64,
    /// Cost basis; defaults to the current value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
}

impl Investment {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        investment_type: impl Into<String>,
        tax_status: TaxStatus,
        value: f64,
    ) -> Self {
        Self {
            id: InvestmentId::new(id),
            investment_type: InvestmentTypeId::new(investment_type),
            tax_status,
            value,
            purchase_price: None,
        }
    }

    #[must_use]
    pub fn with_purchase_price(mut self, purchase_price: f64) -> Self {
        self.purchase_price = Some(purchase_price);
        self
    }
}
