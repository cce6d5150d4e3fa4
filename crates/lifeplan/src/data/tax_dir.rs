//! Tax data directory
//!
//! Directory structure:
//! tax/
//!   federal.yaml              # Federal income brackets
//!   capital_gains.yaml        # Capital gains brackets
//!   standard_deductions.yaml  # One entry per filing status
//!   rmd_table.yaml            # Optional, defaults to the IRS 2024 table
//!   states/
//!     NY.yaml                 # Optional, one file per state

use std::fs;
use std::path::{Path, PathBuf};

use lifeplan_core::model::{
    Bracket, RmdTable, RmdTableEntry, StandardDeduction, StateBracket, TaxData,
};

use super::storage::{StorageError, load_document};

pub struct TaxDirectory {
    root: PathBuf,
}

impl TaxDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn states_dir(&self) -> PathBuf {
        self.root.join("states")
    }

    fn required<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<T, StorageError> {
        load_document(&self.root.join(file))
    }

    fn load_rmd_table(&self) -> Result<RmdTable, StorageError> {
        let path = self.root.join("rmd_table.yaml");
        if !path.exists() {
            return Ok(RmdTable::default());
        }
        let entries: Vec<RmdTableEntry> = load_document(&path)?;
        Ok(RmdTable { entries })
    }

    fn load_states(&self, data: &mut TaxData) -> Result<(), StorageError> {
        let dir = self.states_dir();
        if !dir.exists() {
            return Ok(());
        }
        let entries = fs::read_dir(&dir)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {e}", dir.display())))?;

        for entry in entries {
            let path = entry
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {e}", dir.display())))?
                .path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == "yaml" || e == "yml");
            let Some(code) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_yaml {
                continue;
            }
            let brackets: Vec<StateBracket> = load_document(&path)?;
            tracing::debug!(state = code, brackets = brackets.len(), "Loaded state table");
            data.states.insert(code.to_ascii_uppercase(), brackets);
        }
        Ok(())
    }

    pub fn load(&self) -> Result<TaxData, StorageError> {
        let federal: Vec<Bracket> = self.required("federal.yaml")?;
        let capital_gains: Vec<Bracket> = self.required("capital_gains.yaml")?;
        let standard_deductions: Vec<StandardDeduction> =
            self.required("standard_deductions.yaml")?;

        let mut data = TaxData {
            federal,
            capital_gains,
            standard_deductions,
            states: Default::default(),
            rmd_table: self.load_rmd_table()?,
        };
        self.load_states(&mut data)?;
        data.validate()
            .map_err(|e| StorageError::Invalid(format!("{}: {e}", self.root.display())))?;

        tracing::info!(
            path = %self.root.display(),
            states = data.states.len(),
            "Loaded tax data"
        );
        Ok(data)
    }
}

/// Tax data from `dir`, or the built-in 2024 tables when there is none
pub fn load_tax_data(dir: Option<&Path>) -> Result<TaxData, StorageError> {
    match dir {
        Some(dir) => TaxDirectory::new(dir).load(),
        None => Ok(TaxData::us_2024()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeplan_core::model::FilingStatus;
    use tempfile::tempdir;

    const FEDERAL: &str = "\
- rate: 0.1
  from: 0
  to: 10000
- rate: 0.2
  from: 10000
";

    const GAINS: &str = "\
- rate: 0.0
  from: 0
  to: 40000
- rate: 0.15
  from: 40000
";

    const DEDUCTIONS: &str = "\
- filing_status: single
  amount: 14600
- filing_status: married_filing_jointly
  amount: 29200
";

    const NY: &str = "\
- rate: 0.04
  from: 0
  to: 8500
- rate: 0.045
  from: 8500
  base_tax: 340
";

    fn write_base(dir: &Path) {
        fs::write(dir.join("federal.yaml"), FEDERAL).unwrap();
        fs::write(dir.join("capital_gains.yaml"), GAINS).unwrap();
        fs::write(dir.join("standard_deductions.yaml"), DEDUCTIONS).unwrap();
    }

    #[test]
    fn test_load_minimal_directory() {
        let dir = tempdir().unwrap();
        write_base(dir.path());

        let data = TaxDirectory::new(dir.path()).load().unwrap();
        assert_eq!(data.federal.len(), 2);
        assert_eq!(data.federal[1].to, None);
        assert_eq!(data.capital_gains[1].rate, 0.15);
        assert_eq!(data.rmd_table, RmdTable::irs_uniform_lifetime_2024());
        assert!(data.states.is_empty());

        let tables = data.tables_for(None).unwrap();
        assert_eq!(tables.standard_deduction(FilingStatus::MarriedFilingJointly), 29_200.0);
    }

    #[test]
    fn test_state_files_keyed_by_code() {
        let dir = tempdir().unwrap();
        write_base(dir.path());
        fs::create_dir(dir.path().join("states")).unwrap();
        fs::write(dir.path().join("states").join("ny.yaml"), NY).unwrap();
        fs::write(dir.path().join("states").join("README.txt"), "ignored").unwrap();

        let data = load_tax_data(Some(dir.path())).unwrap();
        assert_eq!(data.states.len(), 1);
        assert_eq!(data.states["NY"][1].base_tax, 340.0);
        assert!(data.tables_for(Some("NY")).is_ok());
        assert!(data.tables_for(Some("TX")).is_ok());
        assert!(data.tables_for(Some("CA")).is_err());
    }

    #[test]
    fn test_custom_rmd_table_is_validated() {
        let dir = tempdir().unwrap();
        write_base(dir.path());
        fs::write(
            dir.path().join("rmd_table.yaml"),
            "- age: 75\n  divisor: 24.6\n",
        )
        .unwrap();

        let err = TaxDirectory::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
    }

    #[test]
    fn test_missing_federal_file() {
        let dir = tempdir().unwrap();
        let err = TaxDirectory::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[test]
    fn test_demo_directory_matches_builtin_tables() {
        let demo = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/tax");
        let data = TaxDirectory::new(demo).load().unwrap();
        let builtin = TaxData::us_2024();
        assert_eq!(data.federal, builtin.federal);
        assert_eq!(data.capital_gains, builtin.capital_gains);
        assert_eq!(data.standard_deductions, builtin.standard_deductions);
        assert_eq!(data.states["NY"].len(), 14);
    }

    #[test]
    fn test_builtin_tables_without_directory() {
        assert_eq!(load_tax_data(None).unwrap(), TaxData::us_2024());
    }
}
