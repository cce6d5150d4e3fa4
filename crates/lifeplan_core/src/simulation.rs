//! Simulation driver
//!
//! A run samples the household's horizon and every event's schedule, then
//! steps the yearly state machine until the holder's end year, an
//! insolvency, or a stop request.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rand_distr::Distribution;
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, warn};

use crate::config::{BatchConfig, SimulationOptions};
use crate::control::RunControl;
use crate::error::{SimulationError, ValidationError, ValidationIssue};
use crate::model::{
    BatchResult, RmdTable, RunOutcome, RunStatus, Scenario, TaxData, TaxTables, YearRecord,
};
use crate::processors::{self, Shortfall};
use crate::scheduler::resolve_schedules;
use crate::simulation_state::{Portfolio, SimulationState, round_cents};
use crate::validation::validate_scenario;

/// Runs per seed chunk of a batch
const MAX_BATCH_SIZE: usize = 100;

/// Validates `scenario` and runs it once with `options.seed`.
pub fn simulate(
    scenario: &Scenario,
    tax_data: &TaxData,
    options: &SimulationOptions,
) -> Result<RunOutcome, SimulationError> {
    simulate_with_control(scenario, tax_data, options, &RunControl::new())
}

pub fn simulate_with_control(
    scenario: &Scenario,
    tax_data: &TaxData,
    options: &SimulationOptions,
    control: &RunControl,
) -> Result<RunOutcome, SimulationError> {
    PreparedScenario::new(scenario, tax_data, options)?.run(options.seed, control)
}

/// Runs `config.runs` independent simulations. Validation happens once.
///
/// Results are ordered and reproducible for a given seed, with or without
/// the `parallel` feature.
pub fn monte_carlo_simulate(
    scenario: &Scenario,
    tax_data: &TaxData,
    config: &BatchConfig,
    control: Option<&RunControl>,
) -> Result<BatchResult, SimulationError> {
    let prepared = PreparedScenario::new(scenario, tax_data, &config.options)?;
    let default_control = RunControl::new();
    prepared.run_batch(
        config.runs,
        config.options.seed,
        control.unwrap_or(&default_control),
    )
}

/// A validated scenario with its tax tables resolved, ready to run many times.
#[derive(Debug, Clone)]
pub struct PreparedScenario<'a> {
    scenario: &'a Scenario,
    tables: TaxTables,
    rmd_table: &'a RmdTable,
    start_year: i32,
    max_years: u32,
}

impl<'a> PreparedScenario<'a> {
    pub fn new(
        scenario: &'a Scenario,
        tax_data: &'a TaxData,
        options: &SimulationOptions,
    ) -> Result<Self, SimulationError> {
        validate_scenario(scenario)?;
        tax_data.validate()?;
        let tables = tax_data.tables_for(scenario.state_of_residence.as_deref())?;

        Ok(Self {
            scenario,
            tables,
            rmd_table: &tax_data.rmd_table,
            start_year: options.resolved_start_year(),
            max_years: options.max_years,
        })
    }

    #[must_use]
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Seeds for `runs` runs: chunks of [`MAX_BATCH_SIZE`], each drawn from
    /// its own generator seeded by `base_seed` and the chunk index.
    fn batch_seeds(runs: usize, base_seed: u64) -> Vec<u64> {
        let num_batches = runs.div_ceil(MAX_BATCH_SIZE);
        (0..num_batches)
            .flat_map(|i| {
                let mut rng = SmallRng::seed_from_u64(base_seed.wrapping_add(i as u64));
                let batch_size = (runs - i * MAX_BATCH_SIZE).min(MAX_BATCH_SIZE);
                (0..batch_size).map(move |_| rng.next_u64())
            })
            .collect()
    }

    pub fn run_batch(
        &self,
        runs: usize,
        base_seed: u64,
        control: &RunControl,
    ) -> Result<BatchResult, SimulationError> {
        let seeds = Self::batch_seeds(runs, base_seed);
        info!(runs, base_seed, scenario = %self.scenario.name, "Starting batch");

        #[cfg(feature = "parallel")]
        let outcomes = seeds
            .into_par_iter()
            .map(|seed| self.run(seed, control))
            .collect::<Result<Vec<_>, _>>()?;
        #[cfg(not(feature = "parallel"))]
        let outcomes = seeds
            .into_iter()
            .map(|seed| self.run(seed, control))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BatchResult { runs: outcomes })
    }

    /// One run with its own generator seeded by `seed`.
    pub fn run(&self, seed: u64, control: &RunControl) -> Result<RunOutcome, SimulationError> {
        let outcome = self.run_years(seed, control)?;
        control.mark_completed();
        Ok(outcome)
    }

    fn run_years(&self, seed: u64, control: &RunControl) -> Result<RunOutcome, SimulationError> {
        let scenario = self.scenario;
        let mut rng = SmallRng::seed_from_u64(seed);

        let user_end_year =
            scenario.birth_year + round_year(scenario.life_expectancy.sample(&mut rng));
        let spouse_end_year = match (
            scenario.is_married,
            scenario.spouse_birth_year,
            &scenario.spouse_life_expectancy,
        ) {
            (true, Some(birth_year), Some(life_expectancy)) => {
                Some(birth_year + round_year(life_expectancy.sample(&mut rng)))
            }
            _ => None,
        };

        let years = i64::from(user_end_year) - i64::from(self.start_year);
        if years > i64::from(self.max_years) {
            warn!(seed, user_end_year, max_years = self.max_years, "Run horizon too long");
            return Ok(RunOutcome {
                seed,
                status: RunStatus::HorizonExceeded {
                    end_year: user_end_year,
                    max_years: self.max_years,
                },
                records: Vec::new(),
            });
        }

        let schedules = resolve_schedules(&scenario.events, &mut rng)?;
        let portfolio = Portfolio::from_investments(&scenario.investments)
            .ok_or_else(|| ValidationError::single(ValidationIssue::MissingCash))?;

        let mut state = SimulationState::new(
            scenario,
            portfolio,
            schedules,
            self.tables.clone(),
            self.rmd_table.clone(),
            rng,
            self.start_year,
            user_end_year,
            spouse_end_year,
        );
        debug!(seed, user_end_year, ?spouse_end_year, "Run horizon");

        let mut records = Vec::with_capacity(usize::try_from(years).unwrap_or(0));
        for year in self.start_year..user_end_year {
            if control.should_stop() {
                debug!(seed, year, "Run stopped");
                return Ok(RunOutcome {
                    seed,
                    status: RunStatus::Cancelled { year },
                    records,
                });
            }

            match step_year(scenario, &mut state, year) {
                Ok(record) => records.push(record),
                Err(Shortfall(shortfall)) => {
                    warn!(seed, year, shortfall, "Run insolvent");
                    return Ok(RunOutcome {
                        seed,
                        status: RunStatus::Insolvent { year, shortfall },
                        records,
                    });
                }
            }
        }

        Ok(RunOutcome {
            seed,
            status: RunStatus::Completed,
            records,
        })
    }
}

/// Advances `state` through `year` and snapshots the result.
fn step_year(
    scenario: &Scenario,
    state: &mut SimulationState,
    year: i32,
) -> Result<YearRecord, Shortfall> {
    if state.is_married && state.spouse_end_year.is_some_and(|end| year >= end) {
        debug!(year, "Spouse's horizon reached");
        state.apply_spouse_death(scenario);
    }

    state.inflation_rate = scenario.inflation.sample(&mut state.rng);
    if year > state.start_year {
        let rate = state.inflation_rate;
        state.apply_inflation(scenario, year, rate);
    }
    state.begin_year();

    processors::income::process(scenario, state, year);
    processors::rmd::process(scenario, state, year);
    processors::growth::process(scenario, state);
    processors::roth::process(scenario, state, year);
    processors::expenses::settle_non_discretionary(scenario, state, year)?;
    processors::expenses::fund_discretionary(scenario, state, year);
    processors::invest::process(scenario, state, year);
    processors::rebalance::process(scenario, state, year);

    state.close_year();
    let taxes = state.totals.taxes;
    let record = YearRecord {
        year,
        investments: state.portfolio.snapshot(),
        events: state.event_snapshots(scenario),
        total_income: state.current.income,
        total_expenses: round_cents(state.totals.expenses),
        federal_tax: taxes.federal,
        state_tax: taxes.state,
        capital_gains_tax: taxes.capital_gains,
        early_withdrawal_tax: taxes.early_withdrawal,
        discretionary_paid_fraction: state.totals.discretionary_paid_fraction,
        inflation_rate: state.inflation_rate,
    };
    state.finish_year();
    Ok(record)
}

fn round_year(value: f64) -> i32 {
    value.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_seeds_are_stable_and_distinct() {
        let a = PreparedScenario::batch_seeds(250, 7);
        let b = PreparedScenario::batch_seeds(250, 7);
        assert_eq!(a.len(), 250);
        assert_eq!(a, b);
        let mut unique = a.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 250);
        assert_ne!(a, PreparedScenario::batch_seeds(250, 8));
    }

    #[test]
    fn test_batch_seeds_prefix_is_shared() {
        let small = PreparedScenario::batch_seeds(30, 1);
        let large = PreparedScenario::batch_seeds(130, 1);
        assert_eq!(small[..], large[..30]);
    }
}
