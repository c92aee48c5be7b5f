//! Configuration file handling.
//!
//! `config.toml` lives in the platform config directory and is written out
//! with defaults on first run. A missing, unreadable, or malformed file
//! never aborts startup; the app degrades to defaults and records why.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How the configuration was obtained.
#[derive(Debug, Clone)]
pub enum ConfigLoadStatus {
    /// Read from an existing file.
    Loaded,
    /// No file yet; defaults were written out.
    Created,
    /// The file could not be used; running on defaults.
    Error(String),
}

/// Settings for the Gemini calls. The API key is a secret and stays in
/// the GEMINI_API_KEY environment variable, never in this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub model: String,
    /// Per-request timeout in seconds. Report sections can take a while.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A config plus where it came from, for the startup log.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_path: PathBuf,
    pub status: ConfigLoadStatus,
}

fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "scholarmind", "scholarmind")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads the config file, creating it on first run, then applies any
/// environment overrides. Infallible; the worst case is plain defaults.
pub fn load_config() -> LoadedConfig {
    let Some(config_path) = config_file_path() else {
        warn!("no platform config directory, running on defaults");
        return LoadedConfig {
            config: apply_env_overrides(Config::default()),
            config_path: PathBuf::from("config.toml"),
            status: ConfigLoadStatus::Error("no platform config directory".to_string()),
        };
    };

    let (config, status) = read_or_create(&config_path);
    LoadedConfig {
        config: apply_env_overrides(config),
        config_path,
        status,
    }
}

fn read_or_create(path: &Path) -> (Config, ConfigLoadStatus) {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return create_default(path),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config_read_failed");
            return (
                Config::default(),
                ConfigLoadStatus::Error(format!("read error: {}", e)),
            );
        }
    };

    match toml::from_str::<Config>(&contents) {
        Ok(config) => {
            debug!(path = %path.display(), "config_loaded");
            (config, ConfigLoadStatus::Loaded)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config_malformed");
            (
                Config::default(),
                ConfigLoadStatus::Error(format!("malformed TOML: {}", e)),
            )
        }
    }
}

/// First run: write the defaults so the user has a file to edit.
fn create_default(path: &Path) -> (Config, ConfigLoadStatus) {
    let config = Config::default();
    let status = match write_default_file(path, &config) {
        Ok(()) => {
            info!(path = %path.display(), "config_created");
            ConfigLoadStatus::Created
        }
        Err(message) => {
            warn!(%message, "config_create_failed");
            ConfigLoadStatus::Error(message)
        }
    };
    (config, status)
}

fn write_default_file(path: &Path, config: &Config) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("could not create config directory: {}", e))?;
    }
    let contents = toml::to_string_pretty(config)
        .map_err(|e| format!("could not serialize defaults: {}", e))?;
    fs::write(path, contents).map_err(|e| format!("could not write {}: {}", path.display(), e))
}

/// SCHOLARMIND_MODEL and SCHOLARMIND_LOG beat the file, and the command
/// line in turn beats both.
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(model) = env::var("SCHOLARMIND_MODEL") {
        debug!(%model, "model_from_env");
        config.gemini.model = model;
    }
    if let Ok(level) = env::var("SCHOLARMIND_LOG") {
        debug!(%level, "log_level_from_env");
        config.logging.level = level;
    }
    config
}
