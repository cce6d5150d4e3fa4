use tracing::{debug, warn};

use crate::liquidation::{WithdrawalPolicy, withdraw};
use crate::model::{FIRST_DISTRIBUTION_AGE, Scenario, TaxStatus};
use crate::simulation_state::{SimulationState, round_cents};

/// Distributions are paid the year after the first distribution age is reached
pub const RMD_START_AGE: i32 = FIRST_DISTRIBUTION_AGE as i32 + 1;

/// Moves the required distribution out of pre-tax holdings into same-type
/// non-retirement holdings.
pub(crate) fn process(scenario: &Scenario, state: &mut SimulationState, year: i32) {
    let age = state.age(year);
    if age < RMD_START_AGE {
        return;
    }

    let pre_tax = state.portfolio.total_value_with(TaxStatus::PreTax);
    if pre_tax <= 0.0 {
        return;
    }

    // Based on last year's age
    let Some(divisor) = state.rmd_table.divisor_for_age(age - 1) else {
        warn!(year, age, "No RMD divisor for age");
        return;
    };
    let required = round_cents(pre_tax / divisor);

    let result = withdraw(
        required,
        &scenario.strategies.rmd,
        &mut state.portfolio,
        &mut state.current,
        WithdrawalPolicy::RMD,
        age,
    );
    debug!(
        year,
        age,
        required,
        distributed = result.withdrawn,
        "Required minimum distribution"
    );
}
