//! Configuration loading and validation for the launcher.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, parsing and validation in [`loader`]
//!
//! # Example
//!
//! ```
//! use inkcut_launcher::config::{parse_config, LauncherConfig};
//! use std::path::Path;
//!
//! let config = parse_config("launch:\n  module: inkcut\n", Path::new("launcher.yml")).unwrap();
//! assert_eq!(config.packages, LauncherConfig::default().packages);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    find_config_file, load_config, load_config_file, parse_config, validate, CONFIG_ENV_VAR,
    CONFIG_FILE_NAME,
};
pub use schema::{
    InstallerConfig, LaunchConfig, LauncherConfig, PackageRequirement, RuntimeConfig,
};
