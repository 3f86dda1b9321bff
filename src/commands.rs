//! CLI command definitions
//!
//! Defines the clap commands for the droid CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::common::paths::DEFAULT_CONFIG_PATH;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured test cases against a device
    Run {
        /// Path to the YAML (or TOML) run configuration
        #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Device serial, overriding `device_id` from the config
        #[arg(long, short)]
        device: Option<String>,

        /// Extra plugin to load (repeatable)
        #[arg(long = "plugin", short = 'p')]
        plugins: Vec<String>,

        /// Extra test case to run (repeatable)
        #[arg(long = "test-case", short = 't')]
        test_cases: Vec<String>,

        /// Root directory for run results, overriding `results_dir`
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Mirror log output to stdout and print error causes
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the built-in plugins and test cases
    List,
}
