//! droid - scripted behavioral tests against Android devices
//!
//! Runs configured test cases against one device over adb and writes a
//! report into a timestamped run directory.

use clap::Parser;
use commands::Commands;
use droid::common::{error, logging};
use droid::{cli, commands};

#[derive(Parser)]
#[command(name = "droid", about = "Android app behavior test harness")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();
    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });

    if let Err(e) = cli::dispatch(cli.command).await {
        if verbose {
            eprintln!("Error: {}", error::chain(&e));
        } else {
            eprintln!("Error: {}", e.full_message());
        }
        std::process::exit(1);
    }
}
