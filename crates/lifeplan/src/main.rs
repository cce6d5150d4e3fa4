use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lifeplan::commands::{render_exploration, render_summary};
use lifeplan::{ExploreArgs, RunArgs, init_logging, run_batch, run_exploration};

#[derive(Parser, Debug)]
#[command(name = "lifeplan")]
#[command(about = "Monte Carlo household financial planning")]
struct Cli {
    /// Directory for the log file (default: log to stderr)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log to ~/.lifeplan/lifeplan.log when no data directory is given
    #[arg(long, global = true)]
    log_file: bool,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a Monte Carlo batch of one scenario
    Run(RunArgs),
    /// Sweep one or two scenario parameters
    Explore(ExploreArgs),
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lifeplan")
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let data_dir = match (cli.data_dir, cli.log_file) {
        (Some(dir), _) => Some(dir),
        (None, true) => Some(default_data_dir()),
        (None, false) => None,
    };
    init_logging(data_dir.as_deref(), &cli.log_level)?;

    match cli.command {
        Command::Run(args) => {
            let batch = run_batch(&args)?;
            print!("{}", render_summary(&batch.summary()));
        }
        Command::Explore(args) => {
            let result = run_exploration(&args)?;
            print!("{}", render_exploration(&result));
        }
    }

    tracing::info!("Done");
    Ok(())
}
