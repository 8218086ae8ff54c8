//! Edgewatch CLI
//!
//! Run widget scenarios against the headless host and validate widget
//! configuration files.

mod config;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use edgewatch_harness::{run_loaded_scenario, RunConfig, Scenario};

#[derive(Parser)]
#[command(name = "edgewatch")]
#[command(author, version, about = "Scroll-edge widget scenario runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON scenario against the headless host
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Widget config (TOML); defaults to edgewatch.toml next to the scenario
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the report to this relative path instead of stdout
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Milliseconds per frame
        #[arg(long, default_value = "16")]
        tick_ms: u64,
    },

    /// Validate a widget config file and print it normalised
    CheckConfig {
        /// Config file (TOML)
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            scenario,
            config,
            report,
            tick_ms,
        } => cmd_run(scenario, config, report, tick_ms),
        Commands::CheckConfig { file } => cmd_check_config(file),
    }
}

fn cmd_run(
    scenario_path: PathBuf,
    config_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
    tick_ms: u64,
) -> Result<ExitCode> {
    let scenario = Scenario::from_path(&scenario_path)?;
    let widget_config = match config_path {
        Some(path) => Some(config::load_widget_config(&path)?),
        None => config::discover_config(&scenario_path)?,
    };
    let run_cfg = RunConfig {
        tick_ms,
        ..Default::default()
    };

    info!("Running {}", scenario_path.display());
    let outcome = run_loaded_scenario(&scenario, widget_config, run_cfg)?;
    let report = outcome.report();

    match report_path {
        Some(path) => {
            report.write_to_path(&path)?;
            info!("Report written to {}", path.display());
        }
        None => report.write_to_writer(&mut io::stdout().lock())?,
    }

    Ok(if outcome.is_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_check_config(file: PathBuf) -> Result<ExitCode> {
    let widget_config = config::load_widget_config(&file)?;
    print!("{}", widget_config.to_toml_string()?);
    Ok(ExitCode::SUCCESS)
}
