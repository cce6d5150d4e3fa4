use std::fmt;

use crate::model::{InvestmentId, InvestmentTypeId};

/// One problem found while checking a scenario before it runs
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    MissingCash,
    CashNotNonRetirement,
    DuplicateInvestment(InvestmentId),
    DuplicateInvestmentType(InvestmentTypeId),
    DuplicateEventName(String),
    UnknownInvestmentType {
        investment: InvestmentId,
        investment_type: InvestmentTypeId,
    },
    UnresolvedEventReference {
        event: String,
        reference: String,
    },
    EventReferenceCycle {
        event: String,
    },
    UnknownStrategyInvestment {
        strategy: &'static str,
        investment: InvestmentId,
    },
    StrategyRequiresPreTax {
        strategy: &'static str,
        investment: InvestmentId,
    },
    UnknownSpendingEvent(String),
    NotDiscretionary(String),
    UnknownAllocationInvestment {
        event: String,
        investment: InvestmentId,
    },
    CashInAllocation {
        event: String,
    },
    GlidePathWithoutTarget {
        event: String,
    },
    AllocationNotNormalized {
        event: String,
        total: f64,
    },
    MissingSpouseData,
    InvalidDistribution {
        field: String,
        reason: &'static str,
    },
    InvalidValue {
        field: String,
        reason: &'static str,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingCash => write!(f, "no investment with id \"cash\""),
            ValidationIssue::CashNotNonRetirement => {
                write!(f, "the cash investment must be non-retirement")
            }
            ValidationIssue::DuplicateInvestment(id) => write!(f, "duplicate investment {id:?}"),
            ValidationIssue::DuplicateInvestmentType(id) => {
                write!(f, "duplicate investment type {id:?}")
            }
            ValidationIssue::DuplicateEventName(name) => write!(f, "duplicate event {name:?}"),
            ValidationIssue::UnknownInvestmentType {
                investment,
                investment_type,
            } => write!(
                f,
                "investment {investment:?} has unknown type {investment_type:?}"
            ),
            ValidationIssue::UnresolvedEventReference { event, reference } => {
                write!(f, "event {event:?} starts relative to unknown event {reference:?}")
            }
            ValidationIssue::EventReferenceCycle { event } => {
                write!(f, "start year of event {event:?} depends on itself")
            }
            ValidationIssue::UnknownStrategyInvestment {
                strategy,
                investment,
            } => write!(f, "{strategy} strategy names unknown investment {investment:?}"),
            ValidationIssue::StrategyRequiresPreTax {
                strategy,
                investment,
            } => write!(
                f,
                "{strategy} strategy names {investment:?}, which is not pre-tax"
            ),
            ValidationIssue::UnknownSpendingEvent(name) => {
                write!(f, "spending strategy names unknown event {name:?}")
            }
            ValidationIssue::NotDiscretionary(name) => write!(
                f,
                "spending strategy names {name:?}, which is not a discretionary expense"
            ),
            ValidationIssue::UnknownAllocationInvestment { event, investment } => {
                write!(f, "event {event:?} allocates to unknown investment {investment:?}")
            }
            ValidationIssue::CashInAllocation { event } => {
                write!(f, "event {event:?} allocates to the cash investment")
            }
            ValidationIssue::GlidePathWithoutTarget { event } => {
                write!(f, "event {event:?} has a glide path but no target allocation")
            }
            ValidationIssue::AllocationNotNormalized { event, total } => {
                write!(f, "allocation of event {event:?} sums to {total}, expected 1")
            }
            ValidationIssue::MissingSpouseData => write!(
                f,
                "married scenario needs spouse_birth_year and spouse_life_expectancy"
            ),
            ValidationIssue::InvalidDistribution { field, reason } => {
                write!(f, "invalid distribution for {field}: {reason}")
            }
            ValidationIssue::InvalidValue { field, reason } => {
                write!(f, "invalid value for {field}: {reason}")
            }
        }
    }
}

/// Every issue found in a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    #[must_use]
    pub fn single(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scenario has {} problem(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Problems with the reference tax dataset
#[derive(Debug, Clone, PartialEq)]
pub enum TaxDataError {
    EmptyFederalTable,
    UnsupportedState(String),
    EmptyRmdTable,
    DuplicateRmdAge(u8),
    RmdAgeGap(u8),
    MissingRmdAge(u8),
    InvalidRmdDivisor(u8),
}

impl fmt::Display for TaxDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxDataError::EmptyFederalTable => write!(f, "federal bracket table is empty"),
            TaxDataError::UnsupportedState(code) => {
                write!(f, "no tax brackets available for state {code:?}")
            }
            TaxDataError::EmptyRmdTable => write!(f, "RMD table is empty"),
            TaxDataError::DuplicateRmdAge(age) => write!(f, "RMD table lists age {age} twice"),
            TaxDataError::RmdAgeGap(age) => write!(f, "RMD table is missing age {age}"),
            TaxDataError::MissingRmdAge(age) => {
                write!(f, "RMD table must start at or before age {age}")
            }
            TaxDataError::InvalidRmdDivisor(age) => {
                write!(f, "RMD divisor for age {age} must be positive")
            }
        }
    }
}

impl std::error::Error for TaxDataError {}

/// A run that could not start
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Validation(ValidationError),
    TaxData(TaxDataError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Validation(e) => write!(f, "{e}"),
            SimulationError::TaxData(e) => write!(f, "tax data: {e}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Validation(e) => Some(e),
            SimulationError::TaxData(e) => Some(e),
        }
    }
}

impl From<ValidationError> for SimulationError {
    fn from(e: ValidationError) -> Self {
        SimulationError::Validation(e)
    }
}

impl From<TaxDataError> for SimulationError {
    fn from(e: TaxDataError) -> Self {
        SimulationError::TaxData(e)
    }
}

/// Failures while setting up or running a parameter sweep
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorationError {
    InvalidOverride(String),
    UnknownEvent(String),
    WrongEventKind {
        event: String,
        expected: &'static str,
    },
    InvalidRange {
        parameter: String,
        reason: &'static str,
    },
    InvalidAxes(usize),
    Simulation(SimulationError),
    Cancelled,
}

impl fmt::Display for ExplorationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorationError::InvalidOverride(s) => write!(f, "invalid parameter override {s:?}"),
            ExplorationError::UnknownEvent(name) => {
                write!(f, "override targets unknown event {name:?}")
            }
            ExplorationError::WrongEventKind { event, expected } => {
                write!(f, "event {event:?} is not an {expected} event")
            }
            ExplorationError::InvalidRange { parameter, reason } => {
                write!(f, "invalid sweep range for {parameter}: {reason}")
            }
            ExplorationError::InvalidAxes(n) => {
                write!(f, "exploration needs one or two parameters, got {n}")
            }
            ExplorationError::Simulation(e) => write!(f, "{e}"),
            ExplorationError::Cancelled => write!(f, "exploration cancelled"),
        }
    }
}

impl std::error::Error for ExplorationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExplorationError::Simulation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SimulationError> for ExplorationError {
    fn from(e: SimulationError) -> Self {
        ExplorationError::Simulation(e)
    }
}
