//! Identifiers for scenario entities
//!
//! Strategy lists and allocation maps refer to holdings and investment types
//! by opaque string identifiers, so each kind gets its own newtype to keep
//! them from being mixed up.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the liquidity buffer every cash-flow processor touches.
pub const CASH_ID: &str = "cash";

/// Stable identifier of a holding, as referenced by strategies and allocations
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvestmentId(pub String);

impl InvestmentId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn cash() -> Self {
        Self(CASH_ID.to_string())
    }

    #[must_use]
    pub fn is_cash(&self) -> bool {
        self.0 == CASH_ID
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvestmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvestmentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Borrow<str> for InvestmentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of an investment type (return/income model)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvestmentTypeId(pub String);

impl InvestmentTypeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvestmentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvestmentTypeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Borrow<str> for InvestmentTypeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
