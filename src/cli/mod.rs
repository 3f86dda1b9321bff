//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use colored::Colorize;
use std::path::Path;

use crate::commands::Commands;
use crate::common::config::{FileConfig, Overrides, RunConfiguration};
use crate::common::logging::RunLogger;
use crate::common::{paths, Error, Result};
use crate::device::AdbDevice;
use crate::orchestrator::{Orchestrator, Registries, RunReport};
use crate::result::{Value, ERROR_KEY};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            config,
            device,
            plugins,
            test_cases,
            results_dir,
            verbose,
        } => {
            let overrides = Overrides {
                device_id: device,
                results_dir,
                plugins,
                test_cases,
            };
            run(&config, overrides, verbose).await
        }

        Commands::List => {
            list(&Registries::builtin());
            Ok(())
        }
    }
}

async fn run(config_path: &Path, overrides: Overrides, verbose: bool) -> Result<()> {
    let config = RunConfiguration::new(FileConfig::load(config_path)?.merge(overrides))?;

    let logger = RunLogger::init(&config.run_dir, verbose)?;
    tracing::info!(config = %config_path.display(), run_id = %config.run_id, "Loaded configuration");

    let device = AdbDevice::new(&config).map_err(|e| {
        tracing::error!(error = %e, "Could not open device session");
        Error::OrchestratorInit(Box::new(e))
    })?;
    let run_dir = config.run_dir.clone();
    let log_path = logger.log_path().to_path_buf();

    let mut orchestrator =
        Orchestrator::initialize(config, device, &Registries::builtin(), Some(logger)).await?;
    let report = orchestrator.run().await?;

    print_summary(&report, &run_dir, &log_path);
    Ok(())
}

fn print_summary(report: &RunReport, run_dir: &Path, log_path: &Path) {
    println!(
        "\n{} {}",
        "Test Run:".blue().bold(),
        report.run_id.white().bold()
    );
    println!("  Device: {}", report.device_info);

    for (name, section) in report.results.iter() {
        let error = match section {
            Value::Nested(map) if map.is_error() => map.get_str(ERROR_KEY),
            _ => None,
        };
        match error {
            Some(message) => println!("  {} {}: {}", "✗".red(), name, message.red()),
            None => println!("  {} {}", "✓".green(), name),
        }
    }

    let failed = report.failed_sections().len();
    if failed == 0 {
        println!("\n{}", "All test cases completed".green().bold());
    } else {
        println!(
            "\n{}",
            format!("{} of {} test cases failed", failed, report.results.len())
                .yellow()
                .bold()
        );
    }
    println!("  Report: {}", paths::report_path(run_dir).display());
    println!("  Log:    {}", log_path.display());
}

fn list(registries: &Registries) {
    println!("{}", "Plugins:".bold());
    for name in registries.plugins.names() {
        println!("  {}", name);
    }
    println!("{}", "Test cases:".bold());
    for name in registries.test_cases.names() {
        println!("  {}", name);
    }
}
