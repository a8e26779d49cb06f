//! Application-level configuration loading, including the operator PIN.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_BUZZER_BACK_CONFIG_PATH";
/// Database file created next to the working directory when unconfigured.
const DEFAULT_DB_PATH: &str = "buzzer.db";
/// PIN accepted for operator resets when unconfigured.
const DEFAULT_ADMIN_PIN: &str = "1234";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    db_path: PathBuf,
    admin_pin: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        db_path = %app_config.db_path.display(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Path of the SQLite database file holding rounds and buzz attempts.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// PIN an operator must present to reset rounds.
    ///
    /// This gate hides the reset action from players; it is not a security
    /// boundary.
    pub fn admin_pin(&self) -> &str {
        &self.admin_pin
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            admin_pin: DEFAULT_ADMIN_PIN.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    db_path: Option<PathBuf>,
    admin_pin: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            db_path: value.db_path.unwrap_or(defaults.db_path),
            admin_pin: value.admin_pin.unwrap_or(defaults.admin_pin),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
