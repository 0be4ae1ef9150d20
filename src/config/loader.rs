//! Configuration file discovery and loading.
//!
//! The launcher ships with built-in defaults. A YAML file may override any
//! subset of them; it is looked up in this order:
//! 1. The path in `INKCUT_LAUNCHER_CONFIG`
//! 2. `launcher.yml` next to the launcher executable

use crate::config::schema::LauncherConfig;
use crate::error::{LauncherError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "INKCUT_LAUNCHER_CONFIG";

/// Config file name looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "launcher.yml";

/// Find the config file to use, if any.
///
/// An explicitly named file is returned even if it does not exist so that
/// loading reports it; the implicit file is only returned when present.
pub fn find_config_file<F>(base_dir: &Path, env_fn: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(explicit) = env_fn(CONFIG_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(explicit));
    }

    let path = base_dir.join(CONFIG_FILE_NAME);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Load the effective configuration: defaults overridden by the file, if any.
pub fn load_config<F>(base_dir: &Path, env_fn: F) -> Result<LauncherConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match find_config_file(base_dir, env_fn) {
        Some(path) => {
            tracing::info!("Loading launcher config from {}", path.display());
            load_config_file(&path)?
        }
        None => LauncherConfig::default(),
    };
    validate(&config)?;
    Ok(config)
}

/// Load a single config file.
pub fn load_config_file(path: &Path) -> Result<LauncherConfig> {
    let content = fs::read_to_string(path).map_err(|e| LauncherError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_config(&content, path)
}

/// Parse YAML content into a config, filling gaps from defaults.
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<LauncherConfig> {
    if content.trim().is_empty() {
        return Ok(LauncherConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| LauncherError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Reject configurations the launcher cannot act on.
pub fn validate(config: &LauncherConfig) -> Result<()> {
    let invalid = |message: &str| {
        Err(LauncherError::ConfigValidationError {
            message: message.to_string(),
        })
    };

    if config.installer.mirrors.iter().all(|m| m.trim().is_empty()) {
        return invalid("installer.mirrors must name at least one mirror");
    }
    if config.installer.poll_interval_secs == 0 && config.installer.timeout_secs > 0 {
        return invalid("installer.poll_interval_secs must be positive when a timeout is set");
    }
    if config.launch.module.trim().is_empty() {
        return invalid("launch.module must not be empty");
    }
    if config.runtime.executable.trim().is_empty() {
        return invalid("runtime.executable must not be empty");
    }
    if let Some(pkg) = config
        .packages
        .iter()
        .find(|p| p.pip.trim().is_empty() || p.import_name.trim().is_empty())
    {
        return Err(LauncherError::ConfigValidationError {
            message: format!("package entry {:?} needs both 'pip' and 'import'", pkg.pip),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::VersionTriple;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path(), no_env).unwrap();
        assert_eq!(config, LauncherConfig::default());
    }

    #[test]
    fn file_next_to_executable_is_used() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "app_name: Plotter\nlaunch:\n  module: plotter\n",
        )
        .unwrap();

        let config = load_config(temp.path(), no_env).unwrap();
        assert_eq!(config.app_name, "Plotter");
        assert_eq!(config.launch.module, "plotter");
        // Untouched sections keep their defaults
        assert_eq!(config.launch.grace_period_ms, 2000);
        assert_eq!(config.runtime.version, VersionTriple::new(3, 9, 13));
    }

    #[test]
    fn env_var_overrides_location() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("custom.yml");
        fs::write(&custom, "runtime:\n  version: 3.11.4\n").unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "app_name: Ignored\n").unwrap();

        let custom_str = custom.to_string_lossy().to_string();
        let config = load_config(temp.path(), |key| {
            (key == CONFIG_ENV_VAR).then(|| custom_str.clone())
        })
        .unwrap();

        assert_eq!(config.runtime.version, VersionTriple::new(3, 11, 4));
        assert_eq!(config.app_name, "Inkcut");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yml").to_string_lossy().to_string();
        let err = load_config(temp.path(), |_| Some(missing.clone())).unwrap_err();
        assert!(matches!(err, LauncherError::ConfigParseError { .. }));
    }

    #[test]
    fn invalid_version_is_a_parse_error() {
        let err = parse_config("runtime:\n  version: three\n", Path::new("launcher.yml"))
            .unwrap_err();
        assert!(err.to_string().contains("launcher.yml"));
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("  \n", Path::new("launcher.yml")).unwrap();
        assert_eq!(config, LauncherConfig::default());
    }

    #[test]
    fn packages_list_replaces_defaults() {
        let yaml = "packages:\n  - pip: pyserial\n    import: serial\n";
        let config = parse_config(yaml, Path::new("launcher.yml")).unwrap();
        assert_eq!(config.packages.len(), 1);
        assert_eq!(config.packages[0].import_name, "serial");
    }

    #[test]
    fn validate_rejects_empty_mirrors() {
        let mut config = LauncherConfig::default();
        config.installer.mirrors.clear();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("mirrors"));
    }

    #[test]
    fn validate_rejects_zero_poll_interval_with_timeout() {
        let mut config = LauncherConfig::default();
        config.installer.poll_interval_secs = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));

        config.installer.timeout_secs = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_accepts_largest_timeout() {
        let config = parse_config(
            "installer:\n  timeout_secs: 18446744073709551615\n",
            Path::new("launcher.yml"),
        )
        .unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_rejects_empty_module() {
        let mut config = LauncherConfig::default();
        config.launch.module = " ".into();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn validate_rejects_half_package() {
        let mut config = LauncherConfig::default();
        config.packages[1].import_name.clear();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("inkcut"));
    }
}
