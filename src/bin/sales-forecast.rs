//! # sales-forecast
//!
//! Command-line front end: reads a sales CSV, runs the forecasting
//! pipeline and prints the report as JSON on stdout.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use sales_forecast::ingest::read_records_from_path;
use sales_forecast::pipeline::{run_pipeline, Backtest, PipelineConfig};
use sales_forecast::utils::SolverKind;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = std::result::Result<T, String>;

#[derive(Parser)]
#[command(name = "sales-forecast")]
#[command(about = "Monthly sales forecasting with Holt-Winters smoothing", long_about = None)]
struct Cli {
    /// CSV file with `Year`, `Month` and `Sales Amt` columns
    input: PathBuf,

    /// JSON pipeline configuration; command-line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of months to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Share of the series used for training in the backtest
    #[arg(long)]
    train_ratio: Option<f64>,

    /// How the backtest predictions are produced
    #[arg(long, value_enum)]
    backtest: Option<BacktestArg>,

    /// Parameter search algorithm
    #[arg(long, value_enum)]
    solver: Option<SolverArg>,

    /// Run decomposition and fits one after another
    #[arg(long)]
    sequential: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum BacktestArg {
    InSample,
    Holdout,
}

#[derive(Clone, Copy, ValueEnum)]
enum SolverArg {
    NelderMead,
    CoordinateDescent,
}

impl From<BacktestArg> for Backtest {
    fn from(arg: BacktestArg) -> Self {
        match arg {
            BacktestArg::InSample => Backtest::InSample,
            BacktestArg::Holdout => Backtest::Holdout,
        }
    }
}

impl From<SolverArg> for SolverKind {
    fn from(arg: SolverArg) -> Self {
        match arg {
            SolverArg::NelderMead => SolverKind::NelderMead,
            SolverArg::CoordinateDescent => SolverKind::CoordinateDescent,
        }
    }
}

/// Load the optional config file and apply command-line overrides.
fn load_config(cli: &Cli) -> CliResult<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
        }
        None => PipelineConfig::default(),
    };

    if let Some(horizon) = cli.horizon {
        config = config.with_horizon(horizon);
    }
    if let Some(ratio) = cli.train_ratio {
        config = config.with_train_ratio(ratio);
    }
    if let Some(backtest) = cli.backtest {
        config = config.with_backtest(backtest.into());
    }
    if let Some(solver) = cli.solver {
        config = config.with_solver(solver.into());
    }
    if cli.sequential {
        config = config.sequential();
    }
    Ok(config)
}

fn run(cli: &Cli) -> CliResult<String> {
    let config = load_config(cli)?;
    let records = read_records_from_path(&cli.input).map_err(|e| e.to_string())?;
    let report = run_pipeline(&records, &config).map_err(|e| e.to_string())?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    json.map_err(|e| format!("Failed to serialize report: {}", e))
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_forecast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "sales-forecast",
            "sales.csv",
            "--horizon",
            "6",
            "--backtest",
            "holdout",
            "--solver",
            "coordinate-descent",
            "--sequential",
        ]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.horizon, 6);
        assert_eq!(config.backtest, Backtest::Holdout);
        assert_eq!(config.solver, SolverKind::CoordinateDescent);
        assert!(!config.parallel);
    }

    #[test]
    fn no_flags_keep_defaults() {
        let cli = Cli::parse_from(["sales-forecast", "sales.csv"]);
        assert_eq!(load_config(&cli).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn value_enums_map_onto_library_types() {
        assert_eq!(Backtest::from(BacktestArg::InSample), Backtest::InSample);
        assert_eq!(Backtest::from(BacktestArg::Holdout), Backtest::Holdout);
        assert_eq!(SolverKind::from(SolverArg::NelderMead), SolverKind::NelderMead);
        assert_eq!(
            SolverKind::from(SolverArg::CoordinateDescent),
            SolverKind::CoordinateDescent
        );
    }
}
