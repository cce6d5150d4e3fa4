//! Required Minimum Distribution (RMD) tables
//!
//! The IRS requires minimum withdrawals from pre-tax accounts once the holder
//! reaches the first distribution age. The amount is the prior year-end
//! balance divided by the age's distribution period.

use serde::{Deserialize, Serialize};

use crate::error::TaxDataError;

/// Age whose divisor every table must define
pub const FIRST_DISTRIBUTION_AGE: u8 = 73;

/// IRS Uniform Lifetime Table distribution periods, ages 73 through 120
const UNIFORM_LIFETIME_2024: [f64; 48] = [
    26.5, 25.5, 24.6, 23.7, 22.9, 22.0, 21.1, 20.2, 19.4, 18.5, // 73-82
    17.7, 16.8, 16.0, 15.2, 14.4, 13.7, 12.9, 12.2, 11.5, 10.8, // 83-92
    10.1, 9.5, 8.9, 8.4, 7.8, 7.3, 6.8, 6.4, 6.0, 5.6, // 93-102
    5.2, 4.9, 4.6, 4.3, 4.1, 3.9, 3.7, 3.5, 3.4, 3.3, // 103-112
    3.1, 3.0, 2.9, 2.8, 2.7, 2.5, 2.3, 2.0, // 113-120
];

/// Age-indexed distribution periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmdTable {
    pub entries: Vec<RmdTableEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RmdTableEntry {
    pub age: u8,
    pub divisor: f64,
}

impl Default for RmdTable {
    fn default() -> Self {
        Self::irs_uniform_lifetime_2024()
    }
}

impl RmdTable {
    #[must_use]
    pub fn irs_uniform_lifetime_2024() -> Self {
        let entries = (FIRST_DISTRIBUTION_AGE..)
            .zip(UNIFORM_LIFETIME_2024)
            .map(|(age, divisor)| RmdTableEntry { age, divisor })
            .collect();
        RmdTable { entries }
    }

    /// Distribution period for `age`.
    ///
    /// Ages past the end of the table reuse the last divisor; ages before the
    /// start have none.
    #[must_use]
    pub fn divisor_for_age(&self, age: i32) -> Option<f64> {
        if let Some(entry) = self.entries.iter().find(|e| i32::from(e.age) == age) {
            return Some(entry.divisor);
        }
        let last = self.entries.iter().max_by_key(|e| e.age)?;
        (age > i32::from(last.age)).then_some(last.divisor)
    }

    /// Checks the table is non-empty, contiguous, has positive divisors and
    /// covers the first distribution age.
    pub fn validate(&self) -> Result<(), TaxDataError> {
        if self.entries.is_empty() {
            return Err(TaxDataError::EmptyRmdTable);
        }

        let mut ages: Vec<u8> = self.entries.iter().map(|e| e.age).collect();
        ages.sort_unstable();
        for pair in ages.windows(2) {
            if pair[0] == pair[1] {
                return Err(TaxDataError::DuplicateRmdAge(pair[0]));
            }
            if pair[1] != pair[0] + 1 {
                return Err(TaxDataError::RmdAgeGap(pair[0] + 1));
            }
        }
        if !ages.contains(&FIRST_DISTRIBUTION_AGE) {
            return Err(TaxDataError::MissingRmdAge(FIRST_DISTRIBUTION_AGE));
        }
        if let Some(bad) = self.entries.iter().find(|e| !(e.divisor > 0.0)) {
            return Err(TaxDataError::InvalidRmdDivisor(bad.age));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_divisors() {
        let table = RmdTable::irs_uniform_lifetime_2024();
        assert_eq!(table.divisor_for_age(73), Some(26.5));
        assert_eq!(table.divisor_for_age(80), Some(20.2));
        assert_eq!(table.divisor_for_age(90), Some(12.2));
        assert_eq!(table.divisor_for_age(100), Some(6.4));
        assert_eq!(table.divisor_for_age(120), Some(2.0));
    }

    #[test]
    fn test_bounds() {
        let table = RmdTable::irs_uniform_lifetime_2024();
        assert_eq!(table.divisor_for_age(72), None);
        assert_eq!(table.divisor_for_age(125), Some(2.0));
    }

    #[test]
    fn test_builtin_table_is_valid() {
        assert!(RmdTable::irs_uniform_lifetime_2024().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_tables() {
        let empty = RmdTable { entries: vec![] };
        assert!(matches!(empty.validate(), Err(TaxDataError::EmptyRmdTable)));

        let late_start = RmdTable {
            entries: vec![RmdTableEntry {
                age: 75,
                divisor: 24.6,
            }],
        };
        assert!(matches!(
            late_start.validate(),
            Err(TaxDataError::MissingRmdAge(73))
        ));

        let gap = RmdTable {
            entries: vec![
                RmdTableEntry {
                    age: 73,
                    divisor: 26.5,
                },
                RmdTableEntry {
                    age: 75,
                    divisor: 24.6,
                },
            ],
        };
        assert!(matches!(gap.validate(), Err(TaxDataError::RmdAgeGap(74))));
    }
}
