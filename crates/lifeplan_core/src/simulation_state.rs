//! Runtime state for one simulation run.
//!
//! Built fresh from the immutable [`Scenario`] at the start of a run, mutated
//! year by year, and dropped when the run ends. Nothing here is shared
//! between runs.

use rand::rngs::SmallRng;
use rustc_hash::FxHashMap;

use crate::model::{
    EventKind, EventSnapshot, FilingStatus, Investment, InvestmentId, InvestmentTypeId,
    RmdTable, Scenario, TaxStatus, TaxTables,
};
use crate::scheduler::EventSchedule;
use crate::taxes::TaxBill;

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Portfolio
// ============================================================================

/// A holding as tracked during a run
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub id: InvestmentId,
    pub investment_type: InvestmentTypeId,
    pub tax_status: TaxStatus,
    pub value: f64,
    /// Cost basis ("purchase price")
    pub basis: f64,
}

/// Result of selling part of a holding
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sale {
    pub amount: f64,
    pub basis_released: f64,
    pub gain: f64,
}

impl Holding {
    /// Sells up to `amount`, releasing basis in proportion to the fraction sold.
    pub fn sell(&mut self, amount: f64) -> Sale {
        let amount = amount.min(self.value);
        if amount <= 0.0 {
            return Sale::default();
        }
        let fraction = amount / self.value;
        let basis_released = self.basis * fraction;
        self.value -= amount;
        self.basis -= basis_released;
        Sale {
            amount,
            basis_released,
            gain: amount - basis_released,
        }
    }

    /// Adds value and the same amount of basis.
    pub fn buy(&mut self, amount: f64) {
        self.value += amount;
        self.basis += amount;
    }
}

#[derive(Debug, Clone)]
pub struct Portfolio {
    holdings: Vec<Holding>,
    index: FxHashMap<InvestmentId, usize>,
    cash: usize,
}

impl Portfolio {
    /// Returns `None` when there is no cash holding.
    #[must_use]
    pub fn from_investments(investments: &[Investment]) -> Option<Self> {
        let holdings: Vec<Holding> = investments
            .iter()
            .map(|inv| Holding {
                id: inv.id.clone(),
                investment_type: inv.investment_type.clone(),
                tax_status: inv.tax_status,
                value: inv.value,
                basis: inv.purchase_price.unwrap_or(inv.value),
            })
            .collect();
        let index: FxHashMap<InvestmentId, usize> = holdings
            .iter()
            .enumerate()
            .map(|(i, h)| (h.id.clone(), i))
            .collect();
        let cash = *index.get(crate::model::CASH_ID)?;
        Some(Self {
            holdings,
            index,
            cash,
        })
    }

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn holdings_mut(&mut self) -> &mut [Holding] {
        &mut self.holdings
    }

    #[must_use]
    pub fn position(&self, id: &InvestmentId) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Holding> {
        self.index.get(id).map(|&i| &self.holdings[i])
    }

    #[must_use]
    pub fn at(&self, idx: usize) -> &Holding {
        &self.holdings[idx]
    }

    pub fn at_mut(&mut self, idx: usize) -> &mut Holding {
        &mut self.holdings[idx]
    }

    #[must_use]
    pub fn cash(&self) -> &Holding {
        &self.holdings[self.cash]
    }

    pub fn cash_mut(&mut self) -> &mut Holding {
        &mut self.holdings[self.cash]
    }

    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.holdings.iter().map(|h| h.value).sum()
    }

    #[must_use]
    pub fn total_value_with(&self, status: TaxStatus) -> f64 {
        self.holdings
            .iter()
            .filter(|h| h.tax_status == status)
            .map(|h| h.value)
            .sum()
    }

    /// First holding of `investment_type` under `status`, creating an empty
    /// one derived from `source` when none exists.
    pub fn find_or_create(
        &mut self,
        investment_type: &InvestmentTypeId,
        status: TaxStatus,
        source: &InvestmentId,
    ) -> usize {
        if let Some(idx) = self
            .holdings
            .iter()
            .position(|h| &h.investment_type == investment_type && h.tax_status == status)
        {
            return idx;
        }

        let id = self.derived_id(source, status);
        let idx = self.holdings.len();
        self.index.insert(id.clone(), idx);
        self.holdings.push(Holding {
            id,
            investment_type: investment_type.clone(),
            tax_status: status,
            value: 0.0,
            basis: 0.0,
        });
        idx
    }

    fn derived_id(&self, source: &InvestmentId, status: TaxStatus) -> InvestmentId {
        let source = source.as_str();
        let label = status.label();
        let base = if source.contains(TaxStatus::PreTax.label()) {
            source.replace(TaxStatus::PreTax.label(), label)
        } else {
            format!("{source} {label}")
        };

        let mut candidate = base.clone();
        let mut n = 2;
        while self.index.contains_key(candidate.as_str()) {
            candidate = format!("{base} {n}");
            n += 1;
        }
        InvestmentId(candidate)
    }

    pub fn round_to_cents(&mut self) {
        for h in &mut self.holdings {
            h.value = round_cents(h.value);
            h.basis = round_cents(h.basis);
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Investment> {
        self.holdings
            .iter()
            .map(|h| Investment {
                id: h.id.clone(),
                investment_type: h.investment_type.clone(),
                tax_status: h.tax_status,
                value: h.value,
                purchase_price: Some(h.basis),
            })
            .collect()
    }
}

// ============================================================================
// Yearly accumulators
// ============================================================================

/// Taxable activity gathered over one year, settled the following year
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct YearAccumulators {
    /// Ordinary income, including pre-tax withdrawals and conversions
    pub income: f64,
    pub social_security: f64,
    pub capital_gains: f64,
    /// Retirement withdrawals made before the penalty-free age
    pub early_withdrawals: f64,
}

impl YearAccumulators {
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            income: round_cents(self.income),
            social_security: round_cents(self.social_security),
            capital_gains: round_cents(self.capital_gains),
            early_withdrawals: round_cents(self.early_withdrawals),
        }
    }
}

/// Outputs of the current year that end up in its record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearTotals {
    pub taxes: TaxBill,
    pub expenses: f64,
    pub discretionary_paid_fraction: f64,
}

impl Default for YearTotals {
    fn default() -> Self {
        Self {
            taxes: TaxBill::default(),
            expenses: 0.0,
            discretionary_paid_fraction: 1.0,
        }
    }
}

// ============================================================================
// Event runtime
// ============================================================================

/// Per-run mutable state of one event series
#[derive(Debug, Clone, PartialEq)]
pub struct EventRuntime {
    pub schedule: EventSchedule,
    /// Running amount; `None` until first touched
    pub amount: Option<f64>,
    pub user_percentage: f64,
}

impl EventRuntime {
    /// Current amount, falling back to the initial amount
    #[must_use]
    pub fn current_amount(&self, initial_amount: f64) -> f64 {
        self.amount.unwrap_or(initial_amount)
    }
}

// ============================================================================
// Simulation state
// ============================================================================

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub rng: SmallRng,
    pub start_year: i32,
    pub birth_year: i32,
    pub user_end_year: i32,
    pub spouse_end_year: Option<i32>,
    pub is_married: bool,

    pub portfolio: Portfolio,
    /// Parallel to `Scenario::events`
    pub events: Vec<EventRuntime>,
    pub event_index: FxHashMap<String, usize>,
    pub investment_types: FxHashMap<InvestmentTypeId, usize>,

    pub tables: TaxTables,
    pub rmd_table: RmdTable,
    pub contribution_limit: f64,
    /// After-tax contributions still allowed this year
    pub contribution_room: f64,
    /// Rate sampled this year
    pub inflation_rate: f64,

    pub current: YearAccumulators,
    pub previous: YearAccumulators,
    pub totals: YearTotals,
}

impl SimulationState {
    /// State for the first year. `rng` must be the one the horizon and
    /// schedules were sampled from.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scenario: &Scenario,
        portfolio: Portfolio,
        schedules: Vec<EventSchedule>,
        tables: TaxTables,
        rmd_table: RmdTable,
        rng: SmallRng,
        start_year: i32,
        user_end_year: i32,
        spouse_end_year: Option<i32>,
    ) -> Self {
        let events = scenario
            .events
            .iter()
            .zip(schedules)
            .map(|(event, schedule)| EventRuntime {
                schedule,
                amount: None,
                user_percentage: event.kind.cash_flow().map_or(1.0, |t| t.user_percentage),
            })
            .collect();
        let event_index = scenario
            .events
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        let investment_types = scenario
            .investment_types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        Self {
            rng,
            start_year,
            birth_year: scenario.birth_year,
            user_end_year,
            spouse_end_year,
            is_married: scenario.is_married,
            portfolio,
            events,
            event_index,
            investment_types,
            tables,
            rmd_table,
            contribution_limit: scenario.after_tax_contribution_limit,
            contribution_room: scenario.after_tax_contribution_limit,
            inflation_rate: 0.0,
            current: YearAccumulators::default(),
            previous: YearAccumulators::default(),
            totals: YearTotals::default(),
        }
    }

    #[must_use]
    pub fn age(&self, year: i32) -> i32 {
        year - self.birth_year
    }

    #[must_use]
    pub fn filing_status(&self) -> FilingStatus {
        FilingStatus::for_household(self.is_married)
    }

    /// Rescales every cash flow to the surviving holder's share.
    pub fn apply_spouse_death(&mut self, scenario: &Scenario) {
        self.is_married = false;
        for (event, runtime) in scenario.events.iter().zip(&mut self.events) {
            if let Some(terms) = event.kind.cash_flow() {
                let amount = runtime.current_amount(terms.initial_amount);
                runtime.amount = Some(amount * runtime.user_percentage);
                runtime.user_percentage = 1.0;
            }
        }
    }

    /// Indexes this year's tables, contribution limit and the running amounts
    /// of inflation-adjusted cash flows by `rate`.
    ///
    /// Events that were not active before `year` keep their starting amount.
    pub fn apply_inflation(&mut self, scenario: &Scenario, year: i32, rate: f64) {
        self.tables = self.tables.reindexed(rate);
        self.contribution_limit = round_cents(self.contribution_limit * (1.0 + rate));
        for (event, runtime) in scenario.events.iter().zip(&mut self.events) {
            let inflation_adjusted = event
                .kind
                .cash_flow()
                .is_some_and(|terms| terms.inflation_adjusted);
            if inflation_adjusted
                && runtime.schedule.start_year < year
                && let Some(amount) = runtime.amount.as_mut()
            {
                *amount *= 1.0 + rate;
            }
        }
    }

    /// Clears the current-year accumulators and outputs.
    pub fn begin_year(&mut self) {
        self.current = YearAccumulators::default();
        self.totals = YearTotals::default();
        self.contribution_room = self.contribution_limit;
    }

    /// Rounds money to cents and rolls the accumulators over.
    pub fn close_year(&mut self) {
        self.portfolio.round_to_cents();
        for runtime in &mut self.events {
            if let Some(amount) = runtime.amount.as_mut() {
                *amount = round_cents(*amount);
            }
        }
        self.current = self.current.rounded();
    }

    pub fn finish_year(&mut self) {
        self.previous = self.current;
    }

    #[must_use]
    pub fn event_snapshots(&self, scenario: &Scenario) -> Vec<EventSnapshot> {
        scenario
            .events
            .iter()
            .zip(&self.events)
            .map(|(event, runtime)| EventSnapshot {
                name: event.name.clone(),
                kind: event.kind.label().to_string(),
                start_year: runtime.schedule.start_year,
                duration: runtime.schedule.duration,
                amount: match event.kind {
                    EventKind::Income(_) | EventKind::Expense(_) => runtime.amount,
                    EventKind::Invest(_) | EventKind::Rebalance(_) => None,
                },
                user_percentage: runtime.user_percentage,
            })
            .collect()
    }
}
