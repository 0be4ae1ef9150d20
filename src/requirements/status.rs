//! Package reconciliation outcomes.
//!
//! Each requirement check produces a `PackageStatus`; a full pass over the
//! package list yields a `ReconcileReport`.

/// What reconciliation did for a single package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// Importable before we did anything.
    AlreadyPresent,

    /// Installed with pip during this run.
    Installed,
}

/// Outcome for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    /// The pip package name
    pub package: String,
    pub status: PackageStatus,
}

/// Outcomes for every package, in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub outcomes: Vec<PackageOutcome>,
}

impl ReconcileReport {
    pub fn record(&mut self, package: &str, status: PackageStatus) {
        self.outcomes.push(PackageOutcome {
            package: package.to_string(),
            status,
        });
    }

    /// Packages installed during this run.
    pub fn installed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.status == PackageStatus::Installed)
            .map(|o| o.package.as_str())
            .collect()
    }

    /// Whether nothing had to be installed.
    pub fn all_present(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.status == PackageStatus::AlreadyPresent)
    }
}
