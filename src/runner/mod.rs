//! The launch sequence.
//!
//! - [`workflow`] - Orchestrates one launcher run end to end
//! - [`relaunch`] - Restarting the launcher under the resolved runtime
//! - [`launch`] - Starting the application and checking it stays up

pub mod launch;
pub mod relaunch;
pub mod workflow;

pub use launch::ProcessLauncher;
pub use relaunch::{base_dir, current_invocation, guard_is_set, RelaunchRequest, RELAUNCH_GUARD};
pub use workflow::{Outcome, SystemContext, Workflow};
