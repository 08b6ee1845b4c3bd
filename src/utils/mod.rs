//! Utility modules shared by the supervisor components and binaries

pub mod env;
pub mod error;
pub mod logging;
pub mod time;
pub mod timeout;

// Re-export commonly used items
pub use env::{env_f64_or_zero, env_opt};
pub use error::log_error;
pub use logging::{init_logging, init_logging_from_config};
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
pub use time::{iso_timestamp, local_timestamp};
pub use timeout::{
    run_with_timeout, DEFAULT_HTTP_TIMEOUT, DEFAULT_NOTIFY_TIMEOUT, DEFAULT_PULL_TIMEOUT,
    DEFAULT_SUPERVISOR_TIMEOUT,
};
