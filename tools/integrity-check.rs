//! Registry integrity check and self-heal
//!
//! Usage:
//!   integrity-check [--config <path>] [--fix]
//!
//! Exit codes: 0 (warnings and per-app errors included), 2 if the registry
//! file is missing, 1 if it cannot be read or parsed.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use fleetkeeper::integrity::{exit_status, EXIT_FAILURE};
use fleetkeeper::utils::init_logging_from_config;
use fleetkeeper::{FleetConfig, IntegrityChecker, RegistryError};

#[derive(Parser, Debug)]
#[command(name = "integrity-check", about = "Validate and repair registry applications")]
struct Args {
    /// Config file (TOML); defaults to $FLEETKEEPER_CONFIG or built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Create missing directories, rewrite entry stubs and regenerate the health snapshot
    #[arg(long)]
    fix: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match FleetConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {:#}", e);
            return ExitCode::from(EXIT_FAILURE as u8);
        }
    };
    init_logging_from_config(&config.logging);

    let checker = IntegrityChecker::from_config(&config);
    let result = checker.verify(args.fix);

    match &result {
        Ok(report) => {
            for line in report.lines() {
                println!("{}", line);
            }
        }
        Err(RegistryError::SourceMissing(path)) => {
            println!("Missing registry: {}", path.display());
        }
        Err(e) => {
            println!("{}", e);
        }
    }

    ExitCode::from(exit_status(&result) as u8)
}
