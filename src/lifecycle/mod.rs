//! Application lifecycle: status probing and restarts
//!
//! Two backends:
//! - **Supervised**: the external service manager owns the process; we only
//!   query state and request restarts.
//! - **Manual**: fleetkeeper kills by command line and spawns detached
//!   processes itself, then forgets about them.

pub mod controller;
pub mod process;
pub mod supervisor;
pub mod traits;

pub use controller::{LifecycleController, ManualLifecycle, SupervisedLifecycle};
pub use process::{HostProcesses, ProcessHost, SpawnSpec};
pub use supervisor::{ServiceSupervisor, Systemctl};
pub use traits::{Lifecycle, LifecycleError, Outcome, OutcomeStatus};
