//! Event Builder DSL
//!
//! Fluent construction of [`EventSeries`].
//!
//! ```ignore
//! use lifeplan_core::config::EventBuilder;
//!
//! // Salary for 30 years, growing 3% a year
//! let salary = EventBuilder::income("Salary", 75_000.0)
//!     .starting(2025)
//!     .lasting(30.0)
//!     .change(ChangeSpec::percent(DistributionSpec::fixed(0.03)));
//!
//! // Travel budget starting when the salary stops
//! let travel = EventBuilder::expense("Travel", 10_000.0)
//!     .starting_after("Salary")
//!     .discretionary()
//!     .inflation_adjusted();
//! ```

use crate::model::{
    AllocationPlan, ChangeSpec, DistributionSpec, EventKind, EventSeries, ExpenseEvent,
    IncomeEvent, InvestEvent, RebalanceEvent, StartYearSpec,
};

/// Builder for [`EventSeries`]
///
/// Without a start the event is active from the first simulated year, and
/// without a duration it never ends.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event: EventSeries,
}

impl EventBuilder {
    fn with_kind(name: impl Into<String>, kind: EventKind) -> Self {
        Self {
            event: EventSeries {
                name: name.into(),
                description: String::new(),
                start: StartYearSpec::Fixed { year: 0 },
                duration: DistributionSpec::fixed(0.0),
                kind,
            },
        }
    }

    // =========================================================================
    // Event kinds
    // =========================================================================

    #[must_use]
    pub fn income(name: impl Into<String>, initial_amount: f64) -> Self {
        Self::with_kind(
            name,
            EventKind::Income(IncomeEvent {
                initial_amount,
                expected_change: ChangeSpec::none(),
                inflation_adjusted: false,
                user_percentage: 1.0,
                social_security: false,
            }),
        )
    }

    #[must_use]
    pub fn expense(name: impl Into<String>, initial_amount: f64) -> Self {
        Self::with_kind(
            name,
            EventKind::Expense(ExpenseEvent {
                initial_amount,
                expected_change: ChangeSpec::none(),
                inflation_adjusted: false,
                user_percentage: 1.0,
                discretionary: false,
            }),
        )
    }

    #[must_use]
    pub fn invest(name: impl Into<String>, allocation: AllocationPlan) -> Self {
        Self::with_kind(
            name,
            EventKind::Invest(InvestEvent {
                allocation,
                max_cash: 0.0,
            }),
        )
    }

    #[must_use]
    pub fn rebalance(name: impl Into<String>, allocation: AllocationPlan) -> Self {
        Self::with_kind(name, EventKind::Rebalance(RebalanceEvent { allocation }))
    }

    // =========================================================================
    // Timing
    // =========================================================================

    #[must_use]
    pub fn start(mut self, start: StartYearSpec) -> Self {
        self.event.start = start;
        self
    }

    #[must_use]
    pub fn starting(self, year: i32) -> Self {
        self.start(StartYearSpec::Fixed { year })
    }

    /// Start in the same year as `event`
    #[must_use]
    pub fn starting_with(self, event: impl Into<String>) -> Self {
        self.start(StartYearSpec::WithEvent {
            event: event.into(),
        })
    }

    /// Start the year after `event` ends
    #[must_use]
    pub fn starting_after(self, event: impl Into<String>) -> Self {
        self.start(StartYearSpec::AfterEvent {
            event: event.into(),
        })
    }

    #[must_use]
    pub fn duration(mut self, duration: DistributionSpec) -> Self {
        self.event.duration = duration;
        self
    }

    #[must_use]
    pub fn lasting(self, years: f64) -> Self {
        self.duration(DistributionSpec::fixed(years))
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.event.description = description.into();
        self
    }

    // =========================================================================
    // Cash-flow terms (ignored for invest/rebalance)
    // =========================================================================

    #[must_use]
    pub fn change(mut self, change: ChangeSpec) -> Self {
        match &mut self.event.kind {
            EventKind::Income(e) => e.expected_change = change,
            EventKind::Expense(e) => e.expected_change = change,
            EventKind::Invest(_) | EventKind::Rebalance(_) => {}
        }
        self
    }

    #[must_use]
    pub fn inflation_adjusted(mut self) -> Self {
        match &mut self.event.kind {
            EventKind::Income(e) => e.inflation_adjusted = true,
            EventKind::Expense(e) => e.inflation_adjusted = true,
            EventKind::Invest(_) | EventKind::Rebalance(_) => {}
        }
        self
    }

    /// Share belonging to the primary holder; the rest stops at the spouse's death
    #[must_use]
    pub fn user_percentage(mut self, share: f64) -> Self {
        match &mut self.event.kind {
            EventKind::Income(e) => e.user_percentage = share,
            EventKind::Expense(e) => e.user_percentage = share,
            EventKind::Invest(_) | EventKind::Rebalance(_) => {}
        }
        self
    }

    #[must_use]
    pub fn social_security(mut self) -> Self {
        if let EventKind::Income(e) = &mut self.event.kind {
            e.social_security = true;
        }
        self
    }

    #[must_use]
    pub fn discretionary(mut self) -> Self {
        if let EventKind::Expense(e) = &mut self.event.kind {
            e.discretionary = true;
        }
        self
    }

    #[must_use]
    pub fn max_cash(mut self, max_cash: f64) -> Self {
        if let EventKind::Invest(e) = &mut self.event.kind {
            e.max_cash = max_cash;
        }
        self
    }

    #[must_use]
    pub fn build(self) -> EventSeries {
        self.event
    }
}
