//! Tax calculations
//!
//! Taxes are settled with a one-year lag: what is paid in year Y is computed
//! from year Y-1's accumulated income, gains and early withdrawals, using the
//! tables in effect for year Y.

use serde::{Deserialize, Serialize};

use crate::model::{Bracket, FilingStatus, TaxTables};
use crate::simulation_state::{YearAccumulators, round_cents};

/// Share of Social Security benefits counted as federal taxable income
pub const SOCIAL_SECURITY_TAXABLE_SHARE: f64 = 0.85;

/// Penalty on retirement withdrawals made before the penalty-free age
pub const EARLY_WITHDRAWAL_PENALTY_RATE: f64 = 0.10;

/// Age from which retirement withdrawals are penalty free
pub const EARLY_WITHDRAWAL_AGE: i32 = 59;

/// The four taxes settled in one year
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxBill {
    pub federal: f64,
    pub state: f64,
    pub capital_gains: f64,
    pub early_withdrawal: f64,
}

impl TaxBill {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.federal + self.state + self.capital_gains + self.early_withdrawal
    }

    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            federal: round_cents(self.federal),
            state: round_cents(self.state),
            capital_gains: round_cents(self.capital_gains),
            early_withdrawal: round_cents(self.early_withdrawal),
        }
    }
}

/// Income less the untaxed share of Social Security
#[must_use]
pub fn federal_taxable_income(income: f64, social_security: f64) -> f64 {
    income - (1.0 - SOCIAL_SECURITY_TAXABLE_SHARE) * social_security
}

/// Progressive tax: each band taxes the part of `amount` that falls inside it.
pub fn progressive_tax<'a>(amount: f64, brackets: impl IntoIterator<Item = &'a Bracket>) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }
    brackets
        .into_iter()
        .map(|b| {
            let in_band = (amount.min(b.upper()) - b.from).max(0.0);
            in_band * b.rate
        })
        .sum()
}

/// Federal income tax on `taxable_income` after the standard deduction
#[must_use]
pub fn federal_income_tax(taxable_income: f64, tables: &TaxTables, status: FilingStatus) -> f64 {
    let after_deduction = taxable_income - tables.standard_deduction(status);
    progressive_tax(after_deduction, tables.federal_for(status))
}

/// State income tax: `base_tax + (income - from) * rate` of the band containing
/// `income`; zero when no band applies.
#[must_use]
pub fn state_income_tax(income: f64, tables: &TaxTables, status: FilingStatus) -> f64 {
    tables
        .state_for(status)
        .find(|b| b.contains(income))
        .map_or(0.0, |b| b.base_tax + (income - b.from) * b.rate)
}

#[must_use]
pub fn capital_gains_tax(gains: f64, tables: &TaxTables, status: FilingStatus) -> f64 {
    progressive_tax(gains, tables.capital_gains_for(status)).max(0.0)
}

#[must_use]
pub fn early_withdrawal_tax(early_withdrawals: f64) -> f64 {
    (early_withdrawals * EARLY_WITHDRAWAL_PENALTY_RATE).max(0.0)
}

/// Taxes owed on last year's activity under this year's tables.
#[must_use]
pub fn settle_prior_year(
    prior: &YearAccumulators,
    tables: &TaxTables,
    status: FilingStatus,
) -> TaxBill {
    let taxable = federal_taxable_income(prior.income, prior.social_security);
    TaxBill {
        federal: federal_income_tax(taxable, tables, status),
        state: state_income_tax(taxable, tables, status),
        capital_gains: capital_gains_tax(prior.capital_gains, tables, status),
        early_withdrawal: early_withdrawal_tax(prior.early_withdrawals),
    }
}

/// Federal band with `from <= taxable_income < to`
#[must_use]
pub fn federal_bracket_containing(
    taxable_income: f64,
    tables: &TaxTables,
    status: FilingStatus,
) -> Option<&Bracket> {
    tables
        .federal_for(status)
        .find(|b| taxable_income >= b.from && taxable_income < b.upper())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StateBracket, TaxData};

    fn tables() -> TaxTables {
        TaxData::us_2024()
            .with_state(
                "NY",
                vec![
                    StateBracket {
                        rate: 0.04,
                        from: 0.0,
                        to: Some(8_500.0),
                        base_tax: 0.0,
                        filing_status: None,
                    },
                    StateBracket {
                        rate: 0.045,
                        from: 8_500.0,
                        to: Some(11_700.0),
                        base_tax: 340.0,
                        filing_status: None,
                    },
                    StateBracket {
                        rate: 0.0525,
                        from: 11_700.0,
                        to: None,
                        base_tax: 484.0,
                        filing_status: None,
                    },
                ],
            )
            .tables_for(Some("NY"))
            .unwrap()
    }

    #[test]
    fn test_zero_income_no_tax() {
        let t = tables();
        assert_eq!(federal_income_tax(0.0, &t, FilingStatus::Single), 0.0);
        assert_eq!(federal_income_tax(10_000.0, &t, FilingStatus::Single), 0.0);
        assert_eq!(capital_gains_tax(-500.0, &t, FilingStatus::Single), 0.0);
    }

    #[test]
    fn test_federal_single_progressive() {
        let t = tables();
        // 75,000 - 14,600 = 60,400 taxable
        // 11,600 * 10% + 35,550 * 12% + 13,250 * 22% = 1,160 + 4,266 + 2,915
        let tax = federal_income_tax(75_000.0, &t, FilingStatus::Single);
        assert!((tax - 8_341.0).abs() < 0.01, "Expected 8341, got {tax}");
    }

    #[test]
    fn test_federal_married_uses_joint_schedule() {
        let t = tables();
        // 75,000 - 29,200 = 45,800 taxable
        // 23,200 * 10% + 22,600 * 12% = 2,320 + 2,712
        let tax = federal_income_tax(75_000.0, &t, FilingStatus::MarriedFilingJointly);
        assert!((tax - 5_032.0).abs() < 0.01, "Expected 5032, got {tax}");
    }

    #[test]
    fn test_state_base_plus_marginal() {
        let t = tables();
        let tax = state_income_tax(10_000.0, &t, FilingStatus::Single);
        // 340 + (10,000 - 8,500) * 4.5%
        assert!((tax - 407.5).abs() < 0.01, "Expected 407.5, got {tax}");
        assert_eq!(state_income_tax(0.0, &t, FilingStatus::Single), 0.0);
    }

    #[test]
    fn test_no_state_table_no_state_tax() {
        let t = TaxData::us_2024().tables_for(Some("FL")).unwrap();
        assert_eq!(state_income_tax(100_000.0, &t, FilingStatus::Single), 0.0);
    }

    #[test]
    fn test_capital_gains_bands() {
        let t = tables();
        assert_eq!(capital_gains_tax(40_000.0, &t, FilingStatus::Single), 0.0);
        let tax = capital_gains_tax(57_025.0, &t, FilingStatus::Single);
        // 10,000 above the 0% band at 15%
        assert!((tax - 1_500.0).abs() < 0.01, "Expected 1500, got {tax}");
    }

    #[test]
    fn test_social_security_partially_taxed() {
        assert!((federal_taxable_income(50_000.0, 20_000.0) - 47_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_settle_prior_year() {
        let prior = YearAccumulators {
            income: 75_000.0,
            social_security: 0.0,
            capital_gains: 0.0,
            early_withdrawals: 2_000.0,
        };
        let bill = settle_prior_year(&prior, &tables(), FilingStatus::Single);
        assert!((bill.federal - 8_341.0).abs() < 0.01);
        // 484 + (75,000 - 11,700) * 5.25%
        assert!((bill.state - 3_807.25).abs() < 0.01);
        assert!((bill.early_withdrawal - 200.0).abs() < 0.01);
        assert!((bill.total() - (8_341.0 + 3_807.25 + 200.0)).abs() < 0.01);
    }

    #[test]
    fn test_bracket_lookup_is_right_open() {
        let t = tables();
        let b = federal_bracket_containing(11_600.0, &t, FilingStatus::Single).unwrap();
        assert_eq!(b.rate, 0.12);
        assert_eq!(b.to, Some(47_150.0));
        let top = federal_bracket_containing(1_000_000.0, &t, FilingStatus::Single).unwrap();
        assert_eq!(top.to, None);
    }
}
