//! Configuration types for parameter exploration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SimulationOptions;
use crate::error::ExplorationError;
use crate::model::{DistributionSpec, EventKind, EventSeries, InvestmentId, Scenario, StartYearSpec};

/// A scenario parameter that can be pinned to a swept value.
///
/// Parsed from a small grammar:
/// `is_roth_optimizer_enabled`, `duration:<event>`, `start:<event>`,
/// `initial_amount:<event>` and `alloc:<event>:<first>,<second>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParameterOverride {
    /// Values `>= 0.5` enable the optimizer
    RothOptimizer,
    Duration { event: String },
    StartYear { event: String },
    InitialAmount { event: String },
    /// Two-holding invest allocation: `value`% to `first`, the rest to `second`
    Allocation {
        event: String,
        first: InvestmentId,
        second: InvestmentId,
    },
}

impl ParameterOverride {
    #[must_use]
    pub fn is_toggle(&self) -> bool {
        matches!(self, ParameterOverride::RothOptimizer)
    }

    #[must_use]
    pub fn event(&self) -> Option<&str> {
        match self {
            ParameterOverride::RothOptimizer => None,
            ParameterOverride::Duration { event }
            | ParameterOverride::StartYear { event }
            | ParameterOverride::InitialAmount { event }
            | ParameterOverride::Allocation { event, .. } => Some(event),
        }
    }

    /// Pins this parameter of `scenario` to `value`.
    pub fn apply(&self, scenario: &mut Scenario, value: f64) -> Result<(), ExplorationError> {
        if let ParameterOverride::RothOptimizer = self {
            scenario.roth_optimizer.enabled = value >= 0.5;
            return Ok(());
        }

        let name = self.event().unwrap_or_default();
        let event = scenario
            .event_mut(name)
            .ok_or_else(|| ExplorationError::UnknownEvent(name.to_string()))?;

        match self {
            ParameterOverride::RothOptimizer => {}
            ParameterOverride::Duration { .. } => {
                event.duration = DistributionSpec::fixed(value.round());
            }
            ParameterOverride::StartYear { .. } => {
                event.start = StartYearSpec::Fixed {
                    year: value.round() as i32,
                };
            }
            ParameterOverride::InitialAmount { .. } => set_initial_amount(event, value)?,
            ParameterOverride::Allocation { first, second, .. } => {
                let EventKind::Invest(invest) = &mut event.kind else {
                    return Err(ExplorationError::WrongEventKind {
                        event: event.name.clone(),
                        expected: "invest",
                    });
                };
                let share = (value / 100.0).clamp(0.0, 1.0);
                invest.allocation.initial =
                    BTreeMap::from([(first.clone(), share), (second.clone(), 1.0 - share)]);
                invest.allocation.target = None;
                invest.allocation.glide_path = false;
            }
        }
        Ok(())
    }
}

fn set_initial_amount(event: &mut EventSeries, value: f64) -> Result<(), ExplorationError> {
    match &mut event.kind {
        EventKind::Income(income) => income.initial_amount = value,
        EventKind::Expense(expense) => expense.initial_amount = value,
        EventKind::Invest(_) | EventKind::Rebalance(_) => {
            return Err(ExplorationError::WrongEventKind {
                event: event.name.clone(),
                expected: "income or expense",
            });
        }
    }
    Ok(())
}

impl FromStr for ParameterOverride {
    type Err = ExplorationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ExplorationError::InvalidOverride(s.to_string());

        if s == "is_roth_optimizer_enabled" {
            return Ok(ParameterOverride::RothOptimizer);
        }
        let (kind, rest) = s.split_once(':').ok_or_else(invalid)?;
        if rest.is_empty() {
            return Err(invalid());
        }
        let event = rest.to_string();
        match kind {
            "duration" => Ok(ParameterOverride::Duration { event }),
            "start" => Ok(ParameterOverride::StartYear { event }),
            "initial_amount" => Ok(ParameterOverride::InitialAmount { event }),
            "alloc" => {
                let (event, pair) = rest.rsplit_once(':').ok_or_else(invalid)?;
                let (first, second) = pair.split_once(',').ok_or_else(invalid)?;
                let (first, second) = (first.trim(), second.trim());
                if event.is_empty() || first.is_empty() || second.is_empty() {
                    return Err(invalid());
                }
                Ok(ParameterOverride::Allocation {
                    event: event.to_string(),
                    first: first.into(),
                    second: second.into(),
                })
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for ParameterOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterOverride::RothOptimizer => write!(f, "is_roth_optimizer_enabled"),
            ParameterOverride::Duration { event } => write!(f, "duration:{event}"),
            ParameterOverride::StartYear { event } => write!(f, "start:{event}"),
            ParameterOverride::InitialAmount { event } => write!(f, "initial_amount:{event}"),
            ParameterOverride::Allocation {
                event,
                first,
                second,
            } => write!(f, "alloc:{event}:{first},{second}"),
        }
    }
}

impl TryFrom<String> for ParameterOverride {
    type Error = ExplorationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ParameterOverride> for String {
    fn from(p: ParameterOverride) -> Self {
        p.to_string()
    }
}

/// One explored dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepAxis {
    pub parameter: ParameterOverride,
    /// Range bounds and step; ignored for the Roth toggle
    #[serde(default)]
    pub lower: f64,
    #[serde(default)]
    pub upper: f64,
    #[serde(default = "default_step")]
    pub step: f64,
}

fn default_step() -> f64 {
    1.0
}

impl SweepAxis {
    #[must_use]
    pub fn new(parameter: ParameterOverride, lower: f64, upper: f64, step: f64) -> Self {
        Self {
            parameter,
            lower,
            upper,
            step,
        }
    }

    #[must_use]
    pub fn toggle(parameter: ParameterOverride) -> Self {
        Self::new(parameter, 0.0, 1.0, 1.0)
    }

    pub fn check(&self) -> Result<(), ExplorationError> {
        if self.parameter.is_toggle() {
            return Ok(());
        }
        let invalid = |reason| ExplorationError::InvalidRange {
            parameter: self.parameter.to_string(),
            reason,
        };
        if !(self.lower.is_finite() && self.upper.is_finite() && self.step.is_finite()) {
            return Err(invalid("bounds and step must be finite"));
        }
        if self.step <= 0.0 {
            return Err(invalid("step must be positive"));
        }
        if self.upper < self.lower {
            return Err(invalid("upper bound is below lower bound"));
        }
        if matches!(self.parameter, ParameterOverride::Allocation { .. })
            && (self.lower < 0.0 || self.upper > 100.0)
        {
            return Err(invalid("allocation percentages must lie in 0..=100"));
        }
        Ok(())
    }

    /// `lower, lower + step, ...` up to `upper`; `[0, 1]` for the Roth toggle
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        if self.parameter.is_toggle() {
            return vec![0.0, 1.0];
        }
        if self.step <= 0.0 || self.upper < self.lower {
            return Vec::new();
        }
        let count = ((self.upper - self.lower) / self.step + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|i| self.lower + self.step * i as f64)
            .collect()
    }
}

/// A 1-D or 2-D exploration request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationConfig {
    pub axes: Vec<SweepAxis>,
    #[serde(default = "default_runs")]
    pub runs_per_point: usize,
    #[serde(default)]
    pub options: SimulationOptions,
}

fn default_runs() -> usize {
    100
}

impl ExplorationConfig {
    #[must_use]
    pub fn one_d(axis: SweepAxis, runs_per_point: usize, options: SimulationOptions) -> Self {
        Self {
            axes: vec![axis],
            runs_per_point,
            options,
        }
    }

    #[must_use]
    pub fn two_d(
        first: SweepAxis,
        second: SweepAxis,
        runs_per_point: usize,
        options: SimulationOptions,
    ) -> Self {
        Self {
            axes: vec![first, second],
            runs_per_point,
            options,
        }
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    #[must_use]
    pub fn grid_shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.values().len()).collect()
    }

    #[must_use]
    pub fn total_points(&self) -> usize {
        self.grid_shape().iter().product()
    }

    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.parameter.to_string()).collect()
    }
}

// ============================================================================
// Grid storage
// ============================================================================

/// N-dimensional grid storage with flat backing array and stride-based indexing.
///
/// Stores values in row-major order where the last dimension varies fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid<T> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T> SweepGrid<T> {
    /// Grid from row-major data; `None` if the length does not match `shape`
    pub fn from_data(shape: Vec<usize>, data: Vec<T>) -> Option<Self> {
        let total_size: usize = shape.iter().product();
        if data.len() != total_size {
            return None;
        }
        Some(Self { data, shape })
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert multi-dimensional indices to flat index
    #[must_use]
    pub fn flat_index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.shape.len() {
            return None;
        }
        let strides = compute_strides(&self.shape);
        let mut flat = 0;
        for ((&idx, &size), stride) in indices.iter().zip(&self.shape).zip(strides) {
            if idx >= size {
                return None;
            }
            flat += idx * stride;
        }
        Some(flat)
    }

    #[must_use]
    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        self.flat_index(indices).map(|i| &self.data[i])
    }

    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Iterate over all indices in row-major order
    #[must_use]
    pub fn indices(&self) -> GridIndices {
        grid_indices(&self.shape)
    }
}

/// Compute strides for row-major order
fn compute_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return Vec::new();
    }
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len() - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

pub(crate) fn grid_indices(shape: &[usize]) -> GridIndices {
    GridIndices {
        shape: shape.to_vec(),
        current: vec![0; shape.len()],
        done: shape.is_empty() || shape.contains(&0),
    }
}

/// Iterator over all indices in a grid
pub struct GridIndices {
    shape: Vec<usize>,
    current: Vec<usize>,
    done: bool,
}

impl Iterator for GridIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current.clone();

        // Last dimension varies fastest
        for i in (0..self.shape.len()).rev() {
            self.current[i] += 1;
            if self.current[i] < self.shape[i] {
                break;
            }
            self.current[i] = 0;
            if i == 0 {
                self.done = true;
            }
        }

        Some(result)
    }
}
