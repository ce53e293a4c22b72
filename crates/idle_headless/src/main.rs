//! Headless idle-economy runner.
//!
//! # Usage
//!
//! ```bash
//! # Play the built-in balanced strategy for ten simulated minutes
//! cargo run -p idle_headless -- run
//!
//! # Custom strategy, JSON report with per-tick history
//! cargo run -p idle_headless -- run --strategy my.ron --json --history --output run.json
//!
//! # Validate content and configuration
//! cargo run -p idle_headless -- validate --catalog catalog.ron --config economy.ron
//! ```
//!
//! Reports go to stdout (or `--output`); logs go to stderr.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use idle_core::simulation::Simulation;
use idle_headless::{
    loader::{load_catalog, load_config, load_strategy},
    HeadlessRunner, Result, RunConfig,
};

#[derive(Parser)]
#[command(name = "idle_headless")]
#[command(about = "Headless idle-economy runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scripted strategy
    Run {
        /// Strategy file (defaults to the built-in balanced strategy)
        #[arg(short, long)]
        strategy: Option<PathBuf>,

        /// Catalog file (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Economy config file (defaults to built-in values)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulated seconds to run
        #[arg(long, default_value = "600")]
        seconds: u64,

        /// Wall time per host frame in milliseconds
        #[arg(long, default_value = "250")]
        frame_ms: u64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Include a ledger sample for every tick (JSON only)
        #[arg(long)]
        history: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate catalog, config and strategy files
    Validate {
        /// Catalog file (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Economy config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Strategy file to check against the catalog
        #[arg(short, long)]
        strategy: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr; stdout is for reports
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run {
            strategy,
            catalog,
            config,
            seconds,
            frame_ms,
            json,
            history,
            output,
        } => cmd_run(
            strategy, catalog, config, seconds, frame_ms, json, history, output,
        ),
        Commands::Validate {
            catalog,
            config,
            strategy,
        } => cmd_validate(catalog, config, strategy),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Play a strategy and print the summary.
fn cmd_run(
    strategy: Option<PathBuf>,
    catalog: Option<PathBuf>,
    config: Option<PathBuf>,
    seconds: u64,
    frame_ms: u64,
    json: bool,
    history: bool,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let catalog = load_catalog(catalog.as_deref())?;
    let config = load_config(config.as_deref())?;
    let strategy = load_strategy(strategy.as_deref())?;

    let problems = strategy.validate(&catalog);
    if !problems.is_empty() {
        return Err(idle_headless::HeadlessError::InvalidStrategy(
            problems.join("; "),
        ));
    }

    let sim = Simulation::new(&config, &catalog)?;
    let run_config = RunConfig {
        seconds,
        frame_ms,
        record_history: history && json,
    };
    let summary = HeadlessRunner::new(sim, strategy, run_config)?.run();

    let rendered = if json {
        summary.to_json()?
    } else {
        summary.render_text()
    };

    match output {
        Some(path) => {
            fs::write(&path, rendered)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(ExitCode::SUCCESS)
}

/// Load every file and report all problems found.
fn cmd_validate(
    catalog: Option<PathBuf>,
    config: Option<PathBuf>,
    strategy: Option<PathBuf>,
) -> Result<ExitCode> {
    let catalog = load_catalog(catalog.as_deref())?;
    let mut problems = catalog.validate();

    let config = load_config(config.as_deref())?;
    if let Err(err) = config.validate() {
        problems.push(err.to_string());
    }

    if let Some(path) = strategy {
        let strategy = load_strategy(Some(&path))?;
        problems.extend(strategy.validate(&catalog));
    }

    if problems.is_empty() {
        println!(
            "OK: {} technologies, {} research projects, {} buildings, {} actions, {} starters",
            catalog.technologies.len(),
            catalog.research.len(),
            catalog.buildings.len(),
            catalog.actions.len(),
            catalog.starters.len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        for problem in &problems {
            println!("ERROR: {problem}");
        }
        Ok(ExitCode::FAILURE)
    }
}
