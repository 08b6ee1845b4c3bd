//! Status/restart bridge
//!
//! Usage:
//!   fleet-bridge [--config <path>] [status]
//!   fleet-bridge [--config <path>] restart <alias>

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use fleetkeeper::utils::init_logging_from_config;
use fleetkeeper::{FleetConfig, LifecycleController, RegistrySource};

#[derive(Parser, Debug)]
#[command(name = "fleet-bridge", about = "Report or restart registry applications")]
struct Args {
    /// Config file (TOML); defaults to $FLEETKEEPER_CONFIG or built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<BridgeCommand>,
}

#[derive(Subcommand, Debug)]
enum BridgeCommand {
    /// Print `[alias] state` for every application (default)
    Status,
    /// Restart one application
    Restart { alias: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match FleetConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {:#}", e);
            return ExitCode::from(1);
        }
    };
    init_logging_from_config(&config.logging);

    let registry = RegistrySource::new(&config.registry_path).load();
    let controller = LifecycleController::from_config(&config.lifecycle);

    match args.command.unwrap_or(BridgeCommand::Status) {
        BridgeCommand::Status => {
            for (alias, state) in controller.status_all(&registry).await {
                println!("[{}] {}", alias, state);
            }
            ExitCode::SUCCESS
        }
        BridgeCommand::Restart { alias } => {
            let Some(record) = registry.get(&alias) else {
                println!("unknown app");
                return ExitCode::from(2);
            };
            let outcome = controller.restart(record).await;
            if outcome.is_failed() {
                println!("{}", outcome);
                ExitCode::from(1)
            } else {
                println!("ok");
                ExitCode::SUCCESS
            }
        }
    }
}
