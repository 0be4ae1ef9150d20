//! The interpreter runtime: versions, discovery and installation.
//!
//! - [`VersionTriple`] and output parsing in [`version`]
//! - Running `--version` in [`probe`]
//! - Candidate discovery in [`locator`]
//! - Installer download in [`download`], execution in [`installer`]

pub mod download;
pub mod installer;
pub mod locator;
pub mod probe;
pub mod version;

pub use download::{partial_path, HttpDownloader, ProgressTracker};
pub use installer::{RuntimeInstaller, ERROR_CANCELLED, TEMP_DIR_PREFIX};
#[cfg(windows)]
pub use locator::WindowsRegistry;
pub use locator::{ActiveRuntime, NoRegistry, RegistryLookup, RuntimeLocator};
pub use probe::VersionProbe;
pub use version::VersionTriple;
