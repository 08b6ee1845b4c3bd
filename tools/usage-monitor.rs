//! Usage recorder, intended for an external schedule (cron, systemd timer)
//!
//! Usage:
//!   usage-monitor [--config <path>] [tick]
//!   usage-monitor [--config <path>] report [--alerts <n>]
//!
//! Secrets come from the environment, optionally seeded from `env_file`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};

use fleetkeeper::utils::init_logging_from_config;
use fleetkeeper::{FleetConfig, UsageRecorder};

#[derive(Parser, Debug)]
#[command(name = "usage-monitor", about = "Record metered usage and raise credit alerts")]
struct Args {
    /// Config file (TOML); defaults to $FLEETKEEPER_CONFIG or built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<MonitorCommand>,
}

#[derive(Subcommand, Debug)]
enum MonitorCommand {
    /// Fetch usage, append history, alert on threshold (default)
    Tick,
    /// Print the latest usage record and recent alerts
    Report {
        #[arg(long, default_value_t = 25)]
        alerts: usize,
    },
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

    if let Some(env_file) = &config.env_file {
        match dotenv::from_path(env_file) {
            Ok(()) => debug!("Loaded environment from {:?}", env_file),
            Err(e) => warn!("Environment file {:?} not loaded: {}", env_file, e),
        }
    }

    let recorder = UsageRecorder::from_env(&config);

    match args.command.unwrap_or(MonitorCommand::Tick) {
        MonitorCommand::Tick => {
            let summary = recorder.tick().await;
            println!(
                "usage {:.2} USD ({:.1}% used){}",
                summary.spent,
                summary.fraction_used * 100.0,
                if summary.threshold_alert {
                    " - threshold alert raised"
                } else {
                    ""
                }
            );
        }
        MonitorCommand::Report { alerts } => {
            let latest = recorder.history().latest();
            match serde_json::to_string_pretty(&latest) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("failed to render usage record: {}", e),
            }
            for line in recorder.alerts().recent(alerts) {
                println!("{}", line);
            }
        }
    }

    ExitCode::SUCCESS
}
