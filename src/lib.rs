//! Fleetkeeper - lightweight supervisor for a small fleet of self-hosted applications
//!
//! Answers three questions for an operator about every application declared
//! in a central registry:
//!
//! 1. Is it running? (`lifecycle` status probing)
//! 2. Can it be brought up to date and restarted? (`update` orchestrator)
//! 3. Is its on-disk layout consistent? (`integrity` self-healer)
//!
//! plus a usage recorder (`telemetry`) that raises prepaid-credit alerts.
//!
//! ## Design Principles
//!
//! 1. **Run to completion**: every entry point is a short-lived, single-threaded
//!    read-evaluate-write cycle; all state lives in flat files
//! 2. **Per-application isolation**: a failure on one application never aborts
//!    a batch
//! 3. **Best-effort external calls**: supervisor, VCS and HTTP failures are
//!    captured as outcome text, always under a timeout
//! 4. **Explicit configuration**: components receive paths and limits through
//!    [`config::FleetConfig`], never fixed global paths

// Memory allocator optimization using mimalloc (faster than default allocator)
#[cfg(not(target_os = "windows"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod config;
pub mod integrity;
pub mod lifecycle;
pub mod registry;
pub mod telemetry;
pub mod update;
pub mod utils;

pub use config::FleetConfig;
pub use integrity::{HealthSnapshot, IntegrityChecker, IntegrityReport};
pub use lifecycle::{LifecycleController, Outcome};
pub use registry::{ApplicationRecord, Backend, Registry, RegistryError, RegistrySource};
pub use telemetry::UsageRecorder;
pub use update::{UpdateOrchestrator, UpdateReport};
