//! Package requirements: checking and installing.
//!
//! # Modules
//!
//! - [`checker`] - Import probes for required modules
//! - [`installer`] - pip installs and the reconciliation pass
//! - [`status`] - Per-package outcomes

pub mod checker;
pub mod installer;
pub mod status;

pub use checker::ImportChecker;
pub use installer::PackageReconciler;
pub use status::{PackageOutcome, PackageStatus, ReconcileReport};
