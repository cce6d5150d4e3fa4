//! Exploration evaluator - runs one Monte Carlo batch per grid point.
//!
//! Points are evaluated one after another; each batch runs its simulations in
//! parallel when the `parallel` feature is enabled.

use std::hash::Hasher;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SimulationOptions;
use crate::control::RunControl;
use crate::error::ExplorationError;
use crate::model::{BatchResult, BatchSummary, Scenario, TaxData};
use crate::simulation::PreparedScenario;

use super::config::grid_indices;
use super::{ExplorationConfig, SweepAxis, SweepGrid};

/// Progress tracking for exploration
#[derive(Debug, Clone)]
pub struct SweepProgress {
    /// Completed runs across all points
    completed: Arc<AtomicUsize>,
    /// Total runs across all points
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl SweepProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// A [`RunControl`] sharing this progress's atomics, so every finished
    /// run advances the exploration counter.
    #[must_use]
    pub fn as_run_control(&self) -> RunControl {
        let control = RunControl::from_atomics(self.cancelled.clone(), self.completed.clone());
        match self.deadline {
            Some(deadline) => control.with_deadline(deadline),
            None => control,
        }
    }
}

impl Default for SweepProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// One evaluated grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationPoint {
    /// Parameter values, one per axis
    pub values: Vec<f64>,
    /// Base seed of this point's batch
    pub seed: u64,
    pub summary: BatchSummary,
    pub batch: BatchResult,
}

/// All batches of an exploration, grouped by parameter values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationResult {
    pub labels: Vec<String>,
    /// Swept values for each axis
    pub axis_values: Vec<Vec<f64>>,
    pub points: SweepGrid<ExplorationPoint>,
}

impl ExplorationResult {
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn point(&self, indices: &[usize]) -> Option<&ExplorationPoint> {
        self.points.get(indices)
    }

    /// Success rate of every point, row-major
    #[must_use]
    pub fn success_rates(&self) -> Vec<f64> {
        self.points
            .data()
            .iter()
            .map(|p| p.summary.success_rate)
            .collect()
    }
}

/// Base seed for the batch at `values`, derived from `base_seed`.
#[must_use]
pub fn point_seed(base_seed: u64, values: &[f64]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(base_seed);
    for value in values {
        hasher.write_u64(value.to_bits());
    }
    hasher.finish()
}

/// Sweep one parameter
pub fn explore_1d(
    scenario: &Scenario,
    tax_data: &TaxData,
    axis: SweepAxis,
    runs_per_point: usize,
    options: SimulationOptions,
    progress: Option<&SweepProgress>,
) -> Result<ExplorationResult, ExplorationError> {
    let config = ExplorationConfig::one_d(axis, runs_per_point, options);
    explore(scenario, tax_data, &config, progress)
}

/// Sweep two parameters over their full grid
pub fn explore_2d(
    scenario: &Scenario,
    tax_data: &TaxData,
    first: SweepAxis,
    second: SweepAxis,
    runs_per_point: usize,
    options: SimulationOptions,
    progress: Option<&SweepProgress>,
) -> Result<ExplorationResult, ExplorationError> {
    let config = ExplorationConfig::two_d(first, second, runs_per_point, options);
    explore(scenario, tax_data, &config, progress)
}

/// Run a batch for every point of the configured grid.
///
/// Each point clones `scenario`, applies one override per axis, and runs
/// `runs_per_point` simulations seeded from [`point_seed`].
pub fn explore(
    scenario: &Scenario,
    tax_data: &TaxData,
    config: &ExplorationConfig,
    progress: Option<&SweepProgress>,
) -> Result<ExplorationResult, ExplorationError> {
    if !(1..=2).contains(&config.ndim()) {
        return Err(ExplorationError::InvalidAxes(config.ndim()));
    }
    for axis in &config.axes {
        axis.check()?;
    }

    let axis_values: Vec<Vec<f64>> = config.axes.iter().map(SweepAxis::values).collect();
    let shape = config.grid_shape();
    let total_points = config.total_points();
    if let Some(p) = progress {
        p.reset(total_points * config.runs_per_point);
    }
    let control = progress
        .map(SweepProgress::as_run_control)
        .unwrap_or_default();

    info!(
        points = total_points,
        runs_per_point = config.runs_per_point,
        "Starting exploration"
    );

    let mut points = Vec::with_capacity(total_points);
    for indices in grid_indices(&shape) {
        if control.should_stop() {
            warn!(completed_points = points.len(), "Exploration stopped");
            return Err(ExplorationError::Cancelled);
        }

        let values: Vec<f64> = indices
            .iter()
            .enumerate()
            .map(|(dim, &idx)| axis_values[dim][idx])
            .collect();

        let mut modified = scenario.clone();
        for (axis, &value) in config.axes.iter().zip(&values) {
            axis.parameter.apply(&mut modified, value)?;
        }

        let seed = point_seed(config.options.seed, &values);
        let prepared = PreparedScenario::new(&modified, tax_data, &config.options)?;
        let batch = prepared.run_batch(config.runs_per_point, seed, &control)?;
        if control.should_stop() {
            warn!(completed_points = points.len(), "Exploration stopped");
            return Err(ExplorationError::Cancelled);
        }

        let summary = batch.summary();
        debug!(?values, success_rate = summary.success_rate, "Point evaluated");
        points.push(ExplorationPoint {
            values,
            seed,
            summary,
            batch,
        });
    }

    let points = SweepGrid::from_data(shape, points).ok_or(ExplorationError::InvalidAxes(
        config.ndim(),
    ))?;
    Ok(ExplorationResult {
        labels: config.labels(),
        axis_values,
        points,
    })
}
