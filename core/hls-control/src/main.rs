//! hls-control: command-line control surface for the hearing loss simulator.
//!
//! ## Subcommands
//!
//! - `path`: Print the configuration file location
//! - `show`: Print the stored configuration document
//! - `set`: Edit one configuration element and save
//! - `params`: Compute and print the worker parameters
//! - `run`: Compute, run a dry-run worker for a while, stop, save

mod dry_run;
mod logging;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use hls_core::{HlsError, Settings, Simulator, StorageConfig, WorkerFactory};

#[derive(Parser)]
#[command(name = "hls-control")]
#[command(about = "Hearing loss simulator control surface")]
#[command(version)]
struct Cli {
    /// Use DIR instead of the per-user application directory
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Also write logs to FILE
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the configuration file path
    Path,

    /// Print the current configuration document
    Show,

    /// Apply settings to one element, then save
    Set {
        /// Element name (audiodevice, calibration, gpudevice, hearingloss)
        #[arg(value_name = "ELEMENT")]
        element: String,

        /// JSON object with the keys to change
        #[arg(value_name = "JSON")]
        settings: String,
    },

    /// Compute worker parameters and print them
    Params,

    /// Run a dry-run worker against the current configuration
    Run {
        /// How long to keep the worker running
        #[arg(long, default_value_t = 5)]
        seconds: u64,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] HlsError),

    #[error("Settings are not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Settings must be a JSON object")]
    NotAMapping,
}

fn main() {
    let cli = Cli::parse();
    let _logging_guard = logging::init(cli.log_file.as_deref());

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "hls-control failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let storage = match cli.config_dir {
        Some(dir) => StorageConfig::with_root(dir),
        None => StorageConfig::from_environment()?,
    };

    if let Commands::Path = cli.command {
        println!("{}", storage.config_file().display());
        return Ok(());
    }

    let mut simulator = Simulator::open(storage, dry_run::factory());
    report(simulator.take_warnings());

    match cli.command {
        Commands::Path => {}
        Commands::Show => {
            println!("{}", serde_json::to_string_pretty(&simulator.configuration())?);
        }
        Commands::Set { element, settings } => {
            let settings = parse_settings(&settings)?;
            simulator.edit(&element, &settings)?;
            let path = simulator.save()?;
            println!("Saved {}", path.display());
        }
        Commands::Params => {
            simulator.compute_filters()?;
            if let Some(params) = simulator.parameters() {
                println!("{}", serde_json::to_string_pretty(params)?);
            }
        }
        Commands::Run { seconds } => {
            run_for(&mut simulator, Duration::from_secs(seconds))?;
            report(simulator.shutdown());
        }
    }

    Ok(())
}

fn run_for<F: WorkerFactory>(
    simulator: &mut Simulator<F>,
    duration: Duration,
) -> Result<(), CliError> {
    simulator.compute_filters()?;
    simulator.start_stop_toggle(true)?;
    eprintln!("Running for {}s", duration.as_secs());
    thread::sleep(duration);
    simulator.start_stop_toggle(false)?;
    Ok(())
}

fn parse_settings(raw: &str) -> Result<Settings, CliError> {
    match serde_json::from_str(raw)? {
        serde_json::Value::Object(settings) => Ok(settings),
        _ => Err(CliError::NotAMapping),
    }
}

fn report(warnings: Vec<HlsError>) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}
