//! Resolves each event series' start year and duration once per run.
//!
//! Durations are drawn first, in declaration order. Start years are then
//! resolved with memoization so an event referenced by several others is
//! sampled exactly once.

use rand::Rng;
use rand_distr::Distribution;
use rustc_hash::FxHashMap;

use crate::error::{ValidationError, ValidationIssue};
use crate::model::{DistributionSpec, EventSeries, StartYearSpec};

/// Resolved timing of one event series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSchedule {
    pub start_year: i32,
    /// Active years; zero means open-ended
    pub duration: i32,
}

impl EventSchedule {
    #[must_use]
    pub fn is_active(&self, year: i32) -> bool {
        year >= self.start_year && (self.duration <= 0 || year < self.start_year + self.duration)
    }

    /// Year after the last active year, if bounded
    #[must_use]
    pub fn end_year(&self) -> Option<i32> {
        (self.duration > 0).then_some(self.start_year + self.duration)
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Unvisited,
    InProgress,
    Resolved(i32),
}

/// Samples start years and durations for `events`, in the same order.
pub fn resolve_schedules<R: Rng + ?Sized>(
    events: &[EventSeries],
    rng: &mut R,
) -> Result<Vec<EventSchedule>, ValidationError> {
    let durations: Vec<i32> = events
        .iter()
        .map(|e| round_year(e.duration.sample(rng)).max(0))
        .collect();

    let by_name: FxHashMap<&str, usize> = events
        .iter()
        .enumerate()
        .map(|(i, e)| (e.name.as_str(), i))
        .collect();

    let mut marks = vec![Mark::Unvisited; events.len()];
    let mut schedules = Vec::with_capacity(events.len());
    for idx in 0..events.len() {
        let start_year = resolve_start(idx, events, &durations, &by_name, &mut marks, rng)?;
        schedules.push(EventSchedule {
            start_year,
            duration: durations[idx],
        });
    }
    Ok(schedules)
}

fn resolve_start<R: Rng + ?Sized>(
    idx: usize,
    events: &[EventSeries],
    durations: &[i32],
    by_name: &FxHashMap<&str, usize>,
    marks: &mut [Mark],
    rng: &mut R,
) -> Result<i32, ValidationError> {
    match marks[idx] {
        Mark::Resolved(year) => return Ok(year),
        Mark::InProgress => {
            return Err(ValidationError::single(ValidationIssue::EventReferenceCycle {
                event: events[idx].name.clone(),
            }));
        }
        Mark::Unvisited => marks[idx] = Mark::InProgress,
    }

    let event = &events[idx];
    let year = match &event.start {
        StartYearSpec::WithEvent { event: other } | StartYearSpec::AfterEvent { event: other } => {
            let &other_idx = by_name.get(other.as_str()).ok_or_else(|| {
                ValidationError::single(ValidationIssue::UnresolvedEventReference {
                    event: event.name.clone(),
                    reference: other.clone(),
                })
            })?;
            let other_start = resolve_start(other_idx, events, durations, by_name, marks, rng)?;
            if matches!(event.start, StartYearSpec::AfterEvent { .. }) {
                other_start + durations[other_idx]
            } else {
                other_start
            }
        }
        StartYearSpec::Fixed { year } => *year,
        StartYearSpec::Normal { mean, std_dev } => {
            round_year(DistributionSpec::normal(*mean, *std_dev).sample(rng))
        }
        StartYearSpec::Uniform { lower, upper } => {
            round_year(DistributionSpec::uniform(*lower, *upper).sample(rng))
        }
    };

    marks[idx] = Mark::Resolved(year);
    Ok(year)
}

fn round_year(value: f64) -> i32 {
    value.round() as i32
}
