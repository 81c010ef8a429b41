//! Configuration for awake.
//!
//! There is no default config file. Settings come from built-in defaults,
//! optionally a TOML file named by `--config` or `AWAKE_CONFIG`, and finally
//! the `AWAKE_BACKEND` / `AWAKE_LOG` environment overrides.

use crate::error::ConfigError;
use crate::platform::Backend;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Names a TOML config file
pub const ENV_CONFIG: &str = "AWAKE_CONFIG";

/// Overrides `backend`
pub const ENV_BACKEND: &str = "AWAKE_BACKEND";

/// Overrides `log_level` (any tracing EnvFilter directive)
pub const ENV_LOG: &str = "AWAKE_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Justification shown by OS power diagnostics
    #[serde(default = "default_reason")]
    pub reason: String,

    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Stop other running instances before starting
    #[serde(default)]
    pub replace_running: bool,
}

fn default_reason() -> String {
    "keep system awake".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reason: default_reason(),
            backend: Backend::default(),
            log_level: default_log_level(),
            replace_running: false,
        }
    }
}

impl Config {
    /// Resolve settings from an explicit path, the environment, and defaults.
    ///
    /// `env` is the variable lookup, `std::env::var(..).ok()` in production.
    pub fn resolve<F>(explicit: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env(ENV_CONFIG).filter(|p| !p.is_empty()).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };

        if let Some(backend) = env(ENV_BACKEND).filter(|b| !b.is_empty()) {
            config.backend = backend.parse()?;
        }
        if let Some(level) = env(ENV_LOG).filter(|l| !l.is_empty()) {
            config.log_level = level;
        }
        if config.reason.trim().is_empty() {
            config.reason = default_reason();
        }

        Ok(config)
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: shown.clone(),
            source,
        })?;
        info!("Loaded config from {}", shown);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::resolve(None, env_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.reason, "keep system awake");
        assert_eq!(config.backend, Backend::Auto);
        assert!(!config.replace_running);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("awake.toml");
        fs::write(&path, "backend = \"none\"\nreplace_running = true\n").unwrap();

        let config = Config::resolve(Some(&path), env_from(&[])).unwrap();
        assert_eq!(config.backend, Backend::None);
        assert!(config.replace_running);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_env_names_file_and_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("awake.toml");
        fs::write(&path, "reason = \"long build\"\nbackend = \"systemd\"\n").unwrap();
        let path_str = path.display().to_string();

        let env = env_from(&[
            (ENV_CONFIG, path_str.as_str()),
            (ENV_BACKEND, "none"),
            (ENV_LOG, "awake=debug"),
        ]);
        let config = Config::resolve(None, env).unwrap();
        assert_eq!(config.reason, "long build");
        assert_eq!(config.backend, Backend::None);
        assert_eq!(config.log_level, "awake=debug");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            Config::resolve(Some(&path), env_from(&[])),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_bad_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("awake.toml");
        fs::write(&path, "backend = \"iokit\"\n").unwrap();
        assert!(matches!(
            Config::resolve(Some(&path), env_from(&[])),
            Err(ConfigError::Parse { .. })
        ));

        assert!(matches!(
            Config::resolve(None, env_from(&[(ENV_BACKEND, "iokit")])),
            Err(ConfigError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_blank_reason_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("awake.toml");
        fs::write(&path, "reason = \"  \"\n").unwrap();
        let config = Config::resolve(Some(&path), env_from(&[])).unwrap();
        assert_eq!(config.reason, "keep system awake");
    }
}
