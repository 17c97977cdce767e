//! Configuration file handling.
//!
//! Settings come from an optional `ecotrack.toml` and are then overridden by
//! environment variables. Every field has a default, so an empty file (or no
//! file at all) yields a working in-process setup with the mock analyzer.

use crate::receipt::analyzer::{MockReceiptAnalyzer, DEFAULT_MAX_IMAGE_BYTES};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "ECOTRACK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ECOTRACK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ECOTRACK_LOG_DIR";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_GOOGLE_VISION_API_KEY: &str = "GOOGLE_VISION_API_KEY";

pub const OPENAI_PROVIDER_ID: &str = "openai";
pub const GOOGLE_VISION_PROVIDER_ID: &str = "google_vision";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file; `:memory:` keeps everything in process.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path.trim() == ":memory:"
    }
}

fn default_db_path() -> String {
    "ecotrack.sqlite3".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Absolute directory for rolling log files. `None` means no file logging.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    crate::logging::default_log_level().to_string()
}

/// Which receipt analyzer to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// `auto` picks by which API key is present; any other value names a
    /// provider id directly.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub google_vision_api_key: Option<String>,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai_api_key: None,
            google_vision_api_key: None,
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

impl AnalyzerConfig {
    /// Provider id to select at start-up.
    ///
    /// In `auto` mode: OpenAI when its key is set, else Google Vision when its
    /// key is set, else the mock.
    pub fn preferred_provider(&self) -> &str {
        let provider = self.provider.trim();
        if !provider.eq_ignore_ascii_case("auto") && !provider.is_empty() {
            return provider;
        }
        if has_key(self.openai_api_key.as_deref()) {
            OPENAI_PROVIDER_ID
        } else if has_key(self.google_vision_api_key.as_deref()) {
            GOOGLE_VISION_PROVIDER_ID
        } else {
            MockReceiptAnalyzer::PROVIDER_ID
        }
    }
}

fn default_provider() -> String {
    "auto".to_string()
}

fn default_max_image_bytes() -> u64 {
    DEFAULT_MAX_IMAGE_BYTES
}

fn has_key(value: Option<&str>) -> bool {
    value.is_some_and(|key| !key.trim().is_empty())
}

impl AppConfig {
    /// Parses TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Loads a config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Applies overrides from the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    /// Applies overrides from `lookup`. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(path) = get(ENV_DB_PATH) {
            self.database.path = path;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            self.logging.dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = get(ENV_OPENAI_API_KEY) {
            self.analyzer.openai_api_key = Some(key);
        }
        if let Some(key) = get(ENV_GOOGLE_VISION_API_KEY) {
            self.analyzer.google_vision_api_key = Some(key);
        }
    }
}
