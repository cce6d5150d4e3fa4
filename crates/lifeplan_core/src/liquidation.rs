//! Ordered withdrawal across a strategy list.
//!
//! Every place money leaves a holding in priority order (expense funding,
//! required distributions, Roth conversions) goes through [`withdraw`]. The
//! callers differ only in their [`WithdrawalPolicy`].

use crate::model::{InvestmentId, TaxStatus};
use crate::simulation_state::{Portfolio, YearAccumulators};
use crate::taxes::EARLY_WITHDRAWAL_AGE;

/// Where sold value goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proceeds {
    /// Leaves the portfolio (spent by the caller)
    Spend,
    /// Moves, with its basis, into a holding of the same type under this status
    TransferTo(TaxStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalPolicy {
    /// Only holdings with this status are drawn from
    pub source: Option<TaxStatus>,
    /// Whether retirement withdrawals before the penalty-free age are tracked
    pub track_early_withdrawals: bool,
    pub proceeds: Proceeds,
}

impl WithdrawalPolicy {
    pub const EXPENSE: Self = Self {
        source: None,
        track_early_withdrawals: true,
        proceeds: Proceeds::Spend,
    };

    pub const RMD: Self = Self {
        source: Some(TaxStatus::PreTax),
        track_early_withdrawals: false,
        proceeds: Proceeds::TransferTo(TaxStatus::NonRetirement),
    };

    pub const ROTH_CONVERSION: Self = Self {
        source: Some(TaxStatus::PreTax),
        track_early_withdrawals: false,
        proceeds: Proceeds::TransferTo(TaxStatus::AfterTax),
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Withdrawal {
    pub withdrawn: f64,
    /// Part of the target the strategy could not cover
    pub remaining: f64,
}

/// Drains holdings in `order` until `target` is met or the list runs out.
///
/// Realized gains on non-retirement sales, pre-tax sale amounts and early
/// retirement withdrawals accrue to `acc`.
pub fn withdraw(
    target: f64,
    order: &[InvestmentId],
    portfolio: &mut Portfolio,
    acc: &mut YearAccumulators,
    policy: WithdrawalPolicy,
    age: i32,
) -> Withdrawal {
    let mut remaining = target.max(0.0);
    let mut withdrawn = 0.0;

    for id in order {
        if remaining <= 0.0 {
            break;
        }
        let Some(idx) = portfolio.position(id) else {
            continue;
        };
        let holding = portfolio.at_mut(idx);
        if holding.value <= 0.0 || policy.source.is_some_and(|s| s != holding.tax_status) {
            continue;
        }

        let status = holding.tax_status;
        let investment_type = holding.investment_type.clone();
        let sale = holding.sell(remaining);
        remaining -= sale.amount;
        withdrawn += sale.amount;

        match status {
            TaxStatus::NonRetirement => acc.capital_gains += sale.gain,
            TaxStatus::PreTax => acc.income += sale.amount,
            TaxStatus::AfterTax => {}
        }
        if policy.track_early_withdrawals && status.is_retirement() && age < EARLY_WITHDRAWAL_AGE {
            acc.early_withdrawals += sale.amount;
        }

        if let Proceeds::TransferTo(dest) = policy.proceeds {
            let target_idx = portfolio.find_or_create(&investment_type, dest, id);
            let target = portfolio.at_mut(target_idx);
            target.value += sale.amount;
            target.basis += sale.basis_released;
        }
    }

    Withdrawal {
        withdrawn,
        remaining: remaining.max(0.0),
    }
}

/// Pays `amount` from cash first, then from `order`. Returns the unpaid part.
pub fn pay_from_cash_then(
    amount: f64,
    order: &[InvestmentId],
    portfolio: &mut Portfolio,
    acc: &mut YearAccumulators,
    age: i32,
) -> f64 {
    let from_cash = portfolio.cash_mut().sell(amount).amount;
    let rest = amount - from_cash;
    if rest <= 0.0 {
        return 0.0;
    }
    withdraw(rest, order, portfolio, acc, WithdrawalPolicy::EXPENSE, age).remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Investment;

    fn ids(list: &[&str]) -> Vec<InvestmentId> {
        list.iter().map(|s| InvestmentId::from(*s)).collect()
    }

    fn portfolio() -> Portfolio {
        Portfolio::from_investments(&[
            Investment::new("cash", "cash", TaxStatus::NonRetirement, 1_000.0),
            Investment::new("brokerage", "fund", TaxStatus::NonRetirement, 5_000.0)
                .with_purchase_price(4_000.0),
            Investment::new("ira pre-tax", "fund", TaxStatus::PreTax, 10_000.0),
            Investment::new("roth", "fund", TaxStatus::AfterTax, 3_000.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_withdraw_in_order_until_met() {
        let mut p = portfolio();
        let mut acc = YearAccumulators::default();
        let order = ids(&["brokerage", "ira pre-tax"]);

        let w = withdraw(7_000.0, &order, &mut p, &mut acc, WithdrawalPolicy::EXPENSE, 65);
        assert_eq!(w.remaining, 0.0);
        assert!((w.withdrawn - 7_000.0).abs() < 1e-9);
        assert_eq!(p.get("brokerage").unwrap().value, 0.0);
        assert!((p.get("ira pre-tax").unwrap().value - 8_000.0).abs() < 1e-9);
        // brokerage fully sold: gain 5,000 - 4,000
        assert!((acc.capital_gains - 1_000.0).abs() < 1e-9);
        assert!((acc.income - 2_000.0).abs() < 1e-9);
        assert_eq!(acc.early_withdrawals, 0.0);
    }

    #[test]
    fn test_withdraw_exhaustion_returns_remainder() {
        let mut p = portfolio();
        let mut acc = YearAccumulators::default();
        let order = ids(&["roth", "brokerage"]);

        let w = withdraw(10_000.0, &order, &mut p, &mut acc, WithdrawalPolicy::EXPENSE, 65);
        assert!((w.remaining - 2_000.0).abs() < 1e-9);
        assert!((w.withdrawn - 8_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_early_withdrawals_tracked_for_retirement_only() {
        let mut p = portfolio();
        let mut acc = YearAccumulators::default();
        let order = ids(&["brokerage", "roth", "ira pre-tax"]);

        withdraw(9_000.0, &order, &mut p, &mut acc, WithdrawalPolicy::EXPENSE, 45);
        // 3,000 roth + 1,000 pre-tax
        assert!((acc.early_withdrawals - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_transfer_moves_value_and_basis() {
        let mut p = Portfolio::from_investments(&[
            Investment::new("cash", "cash", TaxStatus::NonRetirement, 0.0),
            Investment::new("ira pre-tax", "fund", TaxStatus::PreTax, 10_000.0)
                .with_purchase_price(6_000.0),
        ])
        .unwrap();
        let mut acc = YearAccumulators::default();

        let w = withdraw(
            2_500.0,
            &ids(&["ira pre-tax"]),
            &mut p,
            &mut acc,
            WithdrawalPolicy::ROTH_CONVERSION,
            45,
        );
        assert!((w.withdrawn - 2_500.0).abs() < 1e-9);

        let roth = p.get("ira after-tax").unwrap();
        assert!((roth.value - 2_500.0).abs() < 1e-9);
        assert!((roth.basis - 1_500.0).abs() < 1e-9);
        assert!((p.total_value() - 10_000.0).abs() < 1e-9);
        assert!((acc.income - 2_500.0).abs() < 1e-9);
        assert_eq!(acc.early_withdrawals, 0.0);
    }

    #[test]
    fn test_source_filter_skips_other_statuses() {
        let mut p = portfolio();
        let mut acc = YearAccumulators::default();
        let w = withdraw(
            500.0,
            &ids(&["roth", "brokerage"]),
            &mut p,
            &mut acc,
            WithdrawalPolicy::RMD,
            80,
        );
        assert_eq!(w.withdrawn, 0.0);
        assert_eq!(w.remaining, 500.0);
    }

    #[test]
    fn test_pay_from_cash_first() {
        let mut p = portfolio();
        let mut acc = YearAccumulators::default();
        let unpaid = pay_from_cash_then(1_500.0, &ids(&["brokerage"]), &mut p, &mut acc, 65);
        assert_eq!(unpaid, 0.0);
        assert_eq!(p.cash().value, 0.0);
        assert!((p.get("brokerage").unwrap().value - 4_500.0).abs() < 1e-9);
        assert!((acc.capital_gains - 100.0).abs() < 1e-9);
    }
}
