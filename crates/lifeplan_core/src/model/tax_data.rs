//! Reference tax dataset, loaded once before any run
//!
//! A [`TaxData`] holds the base-year tables for every supported state. Each
//! run selects its own [`TaxTables`] with [`TaxData::tables_for`] and indexes
//! that copy forward; the dataset itself is never mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rmd::RmdTable;
use super::scenario::FilingStatus;
use super::tax_tables::{Bracket, StandardDeduction, StateBracket, TaxTables};
use crate::error::TaxDataError;

/// States that levy no tax on wage income
pub const NO_INCOME_TAX_STATES: [&str; 9] = ["AK", "FL", "NV", "NH", "SD", "TN", "TX", "WA", "WY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxData {
    pub federal: Vec<Bracket>,
    pub capital_gains: Vec<Bracket>,
    pub standard_deductions: Vec<StandardDeduction>,
    /// Keyed by upper-case state code
    #[serde(default)]
    pub states: BTreeMap<String, Vec<StateBracket>>,
    #[serde(default)]
    pub rmd_table: RmdTable,
}

impl TaxData {
    /// 2024 federal schedules with no state tables
    #[must_use]
    pub fn us_2024() -> Self {
        use FilingStatus::{MarriedFilingJointly as Mfj, Single};

        let federal_rates = [0.10, 0.12, 0.22, 0.24, 0.32, 0.35, 0.37];
        let single = [0.0, 11_600.0, 47_150.0, 100_525.0, 191_950.0, 243_725.0, 609_350.0];
        let joint = [0.0, 23_200.0, 94_300.0, 201_050.0, 383_900.0, 487_450.0, 731_200.0];

        let mut federal = schedule(&federal_rates, &single, Single);
        federal.extend(schedule(&federal_rates, &joint, Mfj));

        let gains_rates = [0.0, 0.15, 0.20];
        let mut capital_gains = schedule(&gains_rates, &[0.0, 47_025.0, 518_900.0], Single);
        capital_gains.extend(schedule(&gains_rates, &[0.0, 94_050.0, 583_750.0], Mfj));

        TaxData {
            federal,
            capital_gains,
            standard_deductions: vec![
                StandardDeduction {
                    filing_status: Single,
                    amount: 14_600.0,
                },
                StandardDeduction {
                    filing_status: Mfj,
                    amount: 29_200.0,
                },
            ],
            states: BTreeMap::new(),
            rmd_table: RmdTable::irs_uniform_lifetime_2024(),
        }
    }

    #[must_use]
    pub fn with_state(mut self, code: &str, brackets: Vec<StateBracket>) -> Self {
        self.states.insert(code.to_ascii_uppercase(), brackets);
        self
    }

    pub fn validate(&self) -> Result<(), TaxDataError> {
        if self.federal.is_empty() {
            return Err(TaxDataError::EmptyFederalTable);
        }
        self.rmd_table.validate()
    }

    /// Base-year tables for a household living in `state`.
    pub fn tables_for(&self, state: Option<&str>) -> Result<TaxTables, TaxDataError> {
        let state_brackets = match state.map(str::to_ascii_uppercase) {
            None => Vec::new(),
            Some(code) => match self.states.get(&code) {
                Some(brackets) => brackets.clone(),
                None if NO_INCOME_TAX_STATES.contains(&code.as_str()) => Vec::new(),
                None => return Err(TaxDataError::UnsupportedState(code)),
            },
        };

        Ok(TaxTables {
            federal: self.federal.clone(),
            state: state_brackets,
            capital_gains: self.capital_gains.clone(),
            standard_deductions: self.standard_deductions.clone(),
        })
    }
}

impl Default for TaxData {
    fn default() -> Self {
        Self::us_2024()
    }
}

fn schedule(rates: &[f64], starts: &[f64], status: FilingStatus) -> Vec<Bracket> {
    rates
        .iter()
        .zip(starts)
        .enumerate()
        .map(|(i, (&rate, &from))| Bracket {
            rate,
            from,
            to: starts.get(i + 1).copied(),
            filing_status: Some(status),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schedules() {
        let data = TaxData::us_2024();
        assert!(data.validate().is_ok());

        let tables = data.tables_for(None).unwrap();
        let single: Vec<_> = tables.federal_for(FilingStatus::Single).collect();
        assert_eq!(single.len(), 7);
        assert_eq!(single[0].to, Some(11_600.0));
        assert_eq!(single[6].to, None);
        assert_eq!(single[6].rate, 0.37);
        assert_eq!(
            tables.standard_deduction(FilingStatus::MarriedFilingJointly),
            29_200.0
        );
    }

    #[test]
    fn test_state_selection() {
        let data = TaxData::us_2024().with_state(
            "ny",
            vec![StateBracket {
                rate: 0.04,
                from: 0.0,
                to: None,
                base_tax: 0.0,
                filing_status: None,
            }],
        );

        assert_eq!(data.tables_for(Some("NY")).unwrap().state.len(), 1);
        assert!(data.tables_for(Some("tx")).unwrap().state.is_empty());
        assert!(matches!(
            data.tables_for(Some("CA")),
            Err(TaxDataError::UnsupportedState(code)) if code == "CA"
        ));
    }
}
