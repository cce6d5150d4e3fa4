mod accounts;
mod distribution;
mod events;
mod ids;
mod results;
mod rmd;
mod scenario;
mod tax_data;
mod tax_tables;

pub use accounts::{Investment, InvestmentType, TaxStatus};
pub use distribution::{AmountMode, ChangeSpec, DistributionSpec, sample_normal, sample_uniform};
pub use events::{
    AllocationPlan, CashFlowTerms, EventKind, EventSeries, ExpenseEvent, IncomeEvent, InvestEvent,
    RebalanceEvent, StartYearSpec,
};
pub use ids::{CASH_ID, InvestmentId, InvestmentTypeId};
pub use results::{
    BatchResult, BatchSummary, EventSnapshot, RunOutcome, RunStatus, YearMedian, YearRecord,
};
pub use rmd::{FIRST_DISTRIBUTION_AGE, RmdTable, RmdTableEntry};
pub use scenario::{FilingStatus, RothOptimizer, Scenario, Strategies};
pub use tax_data::{NO_INCOME_TAX_STATES, TaxData};
pub use tax_tables::{Bracket, StandardDeduction, StateBracket, TaxTables};
