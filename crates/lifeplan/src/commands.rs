//! `run` and `explore` subcommands

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use color_eyre::eyre::{WrapErr, eyre};
use lifeplan_core::analysis::{
    ExplorationConfig, ExplorationResult, ParameterOverride, SweepAxis, SweepProgress, explore,
};
use lifeplan_core::config::{BatchConfig, DEFAULT_MAX_YEARS, SimulationOptions};
use lifeplan_core::model::{BatchResult, BatchSummary};
use lifeplan_core::{RunControl, monte_carlo_simulate};

use crate::data::{load_scenario, load_tax_data, save_document};
use crate::util::format::{format_currency_short, format_percentage};

/// Inputs shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Scenario document (YAML, or JSON by extension)
    pub scenario: PathBuf,

    /// Tax data directory; built-in 2024 tables when omitted
    #[arg(long)]
    pub tax_dir: Option<PathBuf>,

    /// Base seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// First simulated year (default: the current year)
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Skip runs whose sampled horizon exceeds this many years
    #[arg(long, default_value_t = DEFAULT_MAX_YEARS)]
    pub max_years: u32,

    /// Stop after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write results here (JSON by extension, YAML otherwise)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommonArgs {
    fn options(&self) -> SimulationOptions {
        SimulationOptions {
            start_year: self.start_year,
            seed: self.seed,
            max_years: self.max_years,
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.timeout
            .map(|secs| Instant::now() + Duration::from_secs(secs))
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of Monte Carlo runs
    #[arg(short, long, default_value_t = 100)]
    pub runs: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ExploreArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Swept parameter, once or twice: `<parameter>=<lower>..<upper>[/<step>]`,
    /// or just `is_roth_optimizer_enabled`
    #[arg(short, long = "axis", value_parser = parse_axis, required = true)]
    pub axes: Vec<SweepAxis>,

    /// Monte Carlo runs per grid point
    #[arg(short, long, default_value_t = 100)]
    pub runs: usize,
}

/// Parses `duration:Salary=5..15/5` into a sweep axis.
pub fn parse_axis(s: &str) -> Result<SweepAxis, String> {
    let Some((parameter, range)) = s.rsplit_once('=') else {
        let parameter: ParameterOverride = s.parse().map_err(|e| format!("{e}"))?;
        if !parameter.is_toggle() {
            return Err(format!("{s:?} needs a range: {s}=<lower>..<upper>[/<step>]"));
        }
        return Ok(SweepAxis::toggle(parameter));
    };

    let parameter: ParameterOverride = parameter.parse().map_err(|e| format!("{e}"))?;
    let (bounds, step) = match range.split_once('/') {
        Some((bounds, step)) => (bounds, Some(step)),
        None => (range, None),
    };
    let (lower, upper) = bounds
        .split_once("..")
        .ok_or_else(|| format!("range {range:?} must look like <lower>..<upper>"))?;

    let number = |text: &str| {
        text.trim()
            .parse::<f64>()
            .map_err(|_| format!("{text:?} is not a number"))
    };
    let step = step.map(number).transpose()?.unwrap_or(1.0);
    let axis = SweepAxis::new(parameter, number(lower)?, number(upper)?, step);
    axis.check().map_err(|e| e.to_string())?;
    Ok(axis)
}

fn write_output<T: serde::Serialize>(path: Option<&Path>, value: &T) -> color_eyre::Result<()> {
    if let Some(path) = path {
        save_document(path, value)
            .wrap_err_with(|| format!("Failed to save results to {}", path.display()))?;
        tracing::info!("Results written to {}", path.display());
    }
    Ok(())
}

pub fn run_batch(args: &RunArgs) -> color_eyre::Result<BatchResult> {
    let common = &args.common;
    let scenario = load_scenario(&common.scenario)
        .wrap_err_with(|| format!("Failed to load scenario {}", common.scenario.display()))?;
    let tax_data = load_tax_data(common.tax_dir.as_deref()).wrap_err("Failed to load tax data")?;

    let control = match common.deadline() {
        Some(deadline) => RunControl::new().with_deadline(deadline),
        None => RunControl::new(),
    };
    let config = BatchConfig::new(args.runs, common.options());
    let batch = monte_carlo_simulate(&scenario, &tax_data, &config, Some(&control))
        .wrap_err_with(|| format!("Scenario {:?} cannot be simulated", scenario.name))?;

    write_output(common.output.as_deref(), &batch)?;
    Ok(batch)
}

pub fn run_exploration(args: &ExploreArgs) -> color_eyre::Result<ExplorationResult> {
    let common = &args.common;
    if !(1..=2).contains(&args.axes.len()) {
        return Err(eyre!("Exploration needs one or two --axis values"));
    }
    let scenario = load_scenario(&common.scenario)
        .wrap_err_with(|| format!("Failed to load scenario {}", common.scenario.display()))?;
    let tax_data = load_tax_data(common.tax_dir.as_deref()).wrap_err("Failed to load tax data")?;

    let progress = match common.deadline() {
        Some(deadline) => SweepProgress::default().with_deadline(deadline),
        None => SweepProgress::default(),
    };
    let config = ExplorationConfig {
        axes: args.axes.clone(),
        runs_per_point: args.runs,
        options: common.options(),
    };
    let result = explore(&scenario, &tax_data, &config, Some(&progress))
        .wrap_err_with(|| format!("Exploration of {:?} failed", scenario.name))?;

    write_output(common.output.as_deref(), &result)?;
    Ok(result)
}

/// Human-readable batch summary
pub fn render_summary(summary: &BatchSummary) -> String {
    let mut out = format!(
        "Runs: {}  completed: {}  insolvent: {}  cancelled: {}  horizon exceeded: {}\n\
         Success rate: {}\n",
        summary.runs,
        summary.completed,
        summary.insolvent,
        summary.cancelled,
        summary.horizon_exceeded,
        format_percentage(summary.success_rate)
    );
    for median in &summary.median_assets {
        out.push_str(&format!(
            "  {}  {:>16}\n",
            median.year,
            format_currency_short(median.value)
        ));
    }
    out
}

/// Success rate of every grid point, one line per point
pub fn render_exploration(result: &ExplorationResult) -> String {
    let mut out = format!("Parameters: {}\n", result.labels.join(", "));
    for point in result.points.data() {
        let values: Vec<String> = point.values.iter().map(|v| format!("{v}")).collect();
        out.push_str(&format!(
            "  [{}]  {}\n",
            values.join(", "),
            format_percentage(point.summary.success_rate)
        ));
    }
    out
}
