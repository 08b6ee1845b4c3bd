//! Pull and restart one application, or all of them
//!
//! Usage:
//!   updatebot [--config <path>] <alias|all>
//!
//! Exit codes: 0 success, 1 missing argument, 2 unknown alias.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use fleetkeeper::utils::init_logging_from_config;
use fleetkeeper::{FleetConfig, RegistryError, RegistrySource, UpdateOrchestrator};

#[derive(Parser, Debug)]
#[command(name = "updatebot", about = "Fast-forward and restart registry applications")]
struct Args {
    /// Config file (TOML); defaults to $FLEETKEEPER_CONFIG or built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Application alias, or `all`
    target: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let Some(target) = args.target else {
        println!("usage: updatebot <alias|all>");
        return ExitCode::from(1);
    };

    let config = match FleetConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {:#}", e);
            return ExitCode::from(1);
        }
    };
    init_logging_from_config(&config.logging);

    let registry = RegistrySource::new(&config.registry_path).load();
    let orchestrator = UpdateOrchestrator::from_config(&config);

    if target == "all" {
        orchestrator
            .update_all(&registry, |report| println!("{}", report.line()))
            .await;
        return ExitCode::SUCCESS;
    }

    match orchestrator.update_one(&registry, &target).await {
        Ok(report) => {
            println!("{}", report.line());
            ExitCode::SUCCESS
        }
        Err(RegistryError::UnknownAlias(_)) => {
            println!("unknown app");
            ExitCode::from(2)
        }
        Err(e) => {
            println!("error: {}", e);
            ExitCode::from(1)
        }
    }
}
