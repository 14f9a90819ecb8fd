mod commands;
mod preferences;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use commands::Cli;
use preferences::AppPreferences;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Mandelia starting");
    let prefs = AppPreferences::load();

    match cli.command.run(&prefs) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
