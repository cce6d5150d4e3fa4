//! Criterion benchmarks for lifeplan_core simulation
//!
//! Run with: cargo bench -p lifeplan_core

use std::collections::BTreeMap;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lifeplan_core::analysis::{ParameterOverride, SweepAxis, explore_1d};
use lifeplan_core::config::{BatchConfig, EventBuilder, ScenarioBuilder, SimulationOptions};
use lifeplan_core::model::{
    AllocationPlan, ChangeSpec, DistributionSpec, Investment, InvestmentId, InvestmentType,
    Scenario, TaxData, TaxStatus,
};
use lifeplan_core::simulation::{monte_carlo_simulate, simulate};

fn stocks() -> InvestmentType {
    let mut stocks = InvestmentType::new("stocks");
    stocks.expected_return = ChangeSpec::percent(DistributionSpec::normal(0.07, 0.16));
    stocks.expected_income = ChangeSpec::percent(DistributionSpec::fixed(0.015));
    stocks.expense_ratio = 0.0005;
    stocks
}

fn create_household(birth_year: i32) -> Scenario {
    let allocation = BTreeMap::from([
        (InvestmentId::from("brokerage"), 0.7),
        (InvestmentId::from("roth"), 0.3),
    ]);

    ScenarioBuilder::new("Benchmark", birth_year)
        .life_expectancy(DistributionSpec::normal(88.0, 5.0))
        .inflation(DistributionSpec::normal(0.025, 0.01))
        .contribution_limit(7_000.0)
        .financial_goal(50_000.0)
        .roth_optimizer(2035, 2045)
        .with_cash(20_000.0)
        .investment_type(stocks())
        .investment(
            Investment::new("brokerage", "stocks", TaxStatus::NonRetirement, 250_000.0)
                .with_purchase_price(180_000.0),
        )
        .investment(Investment::new("401k", "stocks", TaxStatus::PreTax, 400_000.0))
        .investment(Investment::new("roth", "stocks", TaxStatus::AfterTax, 60_000.0))
        .event(
            EventBuilder::income("Salary", 120_000.0)
                .starting(2025)
                .lasting(15.0)
                .change(ChangeSpec::percent(DistributionSpec::normal(0.03, 0.01)))
                .build(),
        )
        .event(
            EventBuilder::income("Social Security", 32_000.0)
                .starting_after("Salary")
                .social_security()
                .inflation_adjusted()
                .build(),
        )
        .event(
            EventBuilder::expense("Living", 60_000.0)
                .starting(2025)
                .inflation_adjusted()
                .build(),
        )
        .event(
            EventBuilder::expense("Travel", 15_000.0)
                .starting(2040)
                .discretionary()
                .inflation_adjusted()
                .build(),
        )
        .event(
            EventBuilder::invest("Save", AllocationPlan::fixed(allocation))
                .starting(2025)
                .max_cash(30_000.0)
                .build(),
        )
        .spending_strategy(["Travel"])
        .withdrawal_strategy(["brokerage", "401k", "roth"])
        .rmd_strategy(["401k"])
        .roth_strategy(["401k"])
        .build()
}

fn options() -> SimulationOptions {
    SimulationOptions::default().with_start_year(2025)
}

fn bench_single_run(c: &mut Criterion) {
    let scenario = create_household(1980);
    let tax = TaxData::us_2024();
    let options = options();

    c.bench_function("single_run", |b| {
        b.iter(|| simulate(black_box(&scenario), black_box(&tax), black_box(&options)))
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    let scenario = create_household(1980);
    let tax = TaxData::us_2024();

    for runs in [100, 500, 1000].iter() {
        let config = BatchConfig::new(*runs, options());
        group.bench_with_input(BenchmarkId::new("runs", runs), runs, |b, _| {
            b.iter(|| monte_carlo_simulate(black_box(&scenario), &tax, black_box(&config), None))
        });
    }

    group.finish();
}

fn bench_exploration(c: &mut Criterion) {
    let scenario = create_household(1980);
    let tax = TaxData::us_2024();
    let axis = SweepAxis::new(
        ParameterOverride::Duration {
            event: "Salary".into(),
        },
        10.0,
        20.0,
        5.0,
    );

    c.bench_function("explore_1d_3x50", |b| {
        b.iter(|| {
            explore_1d(
                black_box(&scenario),
                &tax,
                axis.clone(),
                50,
                options(),
                None,
            )
        })
    });
}

criterion_group!(benches, bench_single_run, bench_monte_carlo, bench_exploration);
criterion_main!(benches);
