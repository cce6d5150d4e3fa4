//! Simulation results
//!
//! A run produces one [`YearRecord`] per simulated year plus a terminal
//! [`RunStatus`]. Batches collect many runs and can be summarized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::accounts::Investment;

/// State of one event series at the end of a year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub name: String,
    pub kind: String,
    pub start_year: i32,
    pub duration: i32,
    /// Running amount for income/expense events that have been active.
    /// Inflation compounds into it only after the first active year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub user_percentage: f64,
}

/// Immutable snapshot of one simulated year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    pub investments: Vec<Investment>,
    pub events: Vec<EventSnapshot>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub capital_gains_tax: f64,
    pub early_withdrawal_tax: f64,
    /// Share of requested discretionary spending that was funded
    pub discretionary_paid_fraction: f64,
    /// Rate sampled this year; it indexes this year's tables from the second
    /// simulated year on
    pub inflation_rate: f64,
}

impl YearRecord {
    #[must_use]
    pub fn total_assets(&self) -> f64 {
        self.investments.iter().map(|i| i.value).sum()
    }

    #[must_use]
    pub fn total_tax(&self) -> f64 {
        self.federal_tax + self.state_tax + self.capital_gains_tax + self.early_withdrawal_tax
    }

    #[must_use]
    pub fn investment(&self, id: &str) -> Option<&Investment> {
        self.investments.iter().find(|i| i.id.as_str() == id)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every year up to the holder's end year was simulated
    Completed,
    /// Obligations in `year` exceeded what could be liquidated
    Insolvent { year: i32, shortfall: f64 },
    /// Stopped before `year` by cancellation or deadline
    Cancelled { year: i32 },
    /// Sampled end year lies more than `max_years` past the start; not simulated
    HorizonExceeded { end_year: i32, max_years: u32 },
}

/// One run: its seed, terminal status, and the records of completed years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub seed: u64,
    pub status: RunStatus,
    pub records: Vec<YearRecord>,
}

impl RunOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }

    #[must_use]
    pub fn final_assets(&self) -> f64 {
        self.records.last().map_or(0.0, YearRecord::total_assets)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub runs: Vec<RunOutcome>,
}

/// Aggregate statistics over a batch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: usize,
    pub completed: usize,
    pub insolvent: usize,
    pub cancelled: usize,
    pub horizon_exceeded: usize,
    /// Fraction of runs that completed without insolvency
    pub success_rate: f64,
    /// Median total assets per year across the runs that reached that year
    pub median_assets: Vec<YearMedian>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearMedian {
    pub year: i32,
    pub value: f64,
}

impl BatchResult {
    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            runs: self.runs.len(),
            ..Default::default()
        };

        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for run in &self.runs {
            match run.status {
                RunStatus::Completed => summary.completed += 1,
                RunStatus::Insolvent { .. } => summary.insolvent += 1,
                RunStatus::Cancelled { .. } => summary.cancelled += 1,
                RunStatus::HorizonExceeded { .. } => summary.horizon_exceeded += 1,
            }
            for record in &run.records {
                by_year
                    .entry(record.year)
                    .or_default()
                    .push(record.total_assets());
            }
        }

        if summary.runs > 0 {
            summary.success_rate = summary.completed as f64 / summary.runs as f64;
        }
        summary.median_assets = by_year
            .into_iter()
            .map(|(year, mut values)| YearMedian {
                year,
                value: median(&mut values),
            })
            .collect();
        summary
    }
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
