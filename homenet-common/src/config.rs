//! Configuration file loading and defaults
//!
//! The settings file lives at `<config_dir>/homenet/config.json`. It is written
//! with every default on first run, and any field missing from (or left empty
//! in) an existing file is backfilled on load. The resulting [`Config`] is
//! read-only for the rest of the process.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const APP_DIR: &str = "homenet";
const CONFIG_FILE: &str = "config.json";

const DEFAULT_GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Children's",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Fantasy",
    "Holiday",
    "Horror",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Thriller",
    "Western",
];

const DEFAULT_STREAMING_SERVICES: &[&str] = &[
    "Amazon Prime",
    "Apple TV+",
    "Crunchyroll",
    "Disney+",
    "HBO Max",
    "Hulu",
    "Netflix",
    "Other",
    "Paramount+",
    "Peacock",
];

const DEFAULT_BADGE_COLORS: &[(&str, &str)] = &[
    ("year", "gray"),
    ("genre", "blue"),
    ("streaming", "green"),
    ("active", "yellow"),
];

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(rename = "static")]
    pub static_files: StaticConfig,
    pub templates: TemplatesConfig,
    pub fortune: FortuneConfig,
    pub genres: Vec<String>,
    pub streaming_services: Vec<String>,
    pub app_colors: ColorScheme,
    pub badge_colors: BTreeMap<String, String>,
}

/// Local text-generation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// DEBUG, INFO, WARN or ERROR
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub data_dir: PathBuf,
    /// File stem; the store opens `<data_dir>/<db_name>.db`
    pub db_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub dir: PathBuf,
}

/// External command producing the footer fortune
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FortuneConfig {
    pub command: String,
    /// Whitespace-separated argument list
    pub args: String,
    pub fallback_msg: String,
}

/// Tailwind colour names used across pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub warning: String,
    pub error: String,
    pub info: String,
    pub neutral: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            static_files: StaticConfig::default(),
            templates: TemplatesConfig::default(),
            fortune: FortuneConfig::default(),
            genres: DEFAULT_GENRES.iter().map(|s| s.to_string()).collect(),
            streaming_services: DEFAULT_STREAMING_SERVICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            app_colors: ColorScheme::default(),
            badge_colors: DEFAULT_BADGE_COLORS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: "8080".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_name: "homenet".to_string(),
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("web/static"),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("web/templates"),
        }
    }
}

impl Default for FortuneConfig {
    fn default() -> Self {
        Self {
            command: "/usr/games/fortune".to_string(),
            args: "-s".to_string(),
            fallback_msg: "Hello World!".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            primary: "blue".to_string(),
            secondary: "purple".to_string(),
            success: "green".to_string(),
            warning: "yellow".to_string(),
            error: "red".to_string(),
            info: "sky".to_string(),
            neutral: "gray".to_string(),
        }
    }
}

/// `~/.local/share/homenet/data` on Linux
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("data")
}

/// Get the per-user configuration file path for the platform
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR).join(CONFIG_FILE))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

fn fill(value: &mut String, default: &str) {
    if value.trim().is_empty() {
        *value = default.to_string();
    }
}

fn fill_path(value: &mut PathBuf, default: &Path) {
    if value.as_os_str().is_empty() {
        *value = default.to_path_buf();
    }
}

impl Config {
    /// Load the settings file, writing one full of defaults if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if !path.exists() {
            Self::default().write(path)?;
            info!("Created default config file: {}", path.display());
        }

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.backfill_defaults();

        Ok(config)
    }

    /// Write this configuration as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Replace empty values with their defaults
    ///
    /// An explicitly empty string in the file counts as missing.
    pub fn backfill_defaults(&mut self) {
        let defaults = Config::default();

        fill(&mut self.ollama.host, &defaults.ollama.host);
        fill(&mut self.ollama.model_name, &defaults.ollama.model_name);
        fill(&mut self.logging.level, &defaults.logging.level);
        fill(&mut self.server.host, &defaults.server.host);
        fill(&mut self.server.port, &defaults.server.port);
        fill_path(&mut self.database.data_dir, &defaults.database.data_dir);
        fill(&mut self.database.db_name, &defaults.database.db_name);
        fill_path(&mut self.static_files.dir, &defaults.static_files.dir);
        fill_path(&mut self.templates.dir, &defaults.templates.dir);
        fill(&mut self.fortune.command, &defaults.fortune.command);
        fill(&mut self.fortune.args, &defaults.fortune.args);
        fill(&mut self.fortune.fallback_msg, &defaults.fortune.fallback_msg);

        if self.genres.is_empty() {
            self.genres = defaults.genres;
        }
        if self.streaming_services.is_empty() {
            self.streaming_services = defaults.streaming_services;
        }

        let colors = &mut self.app_colors;
        fill(&mut colors.primary, &defaults.app_colors.primary);
        fill(&mut colors.secondary, &defaults.app_colors.secondary);
        fill(&mut colors.success, &defaults.app_colors.success);
        fill(&mut colors.warning, &defaults.app_colors.warning);
        fill(&mut colors.error, &defaults.app_colors.error);
        fill(&mut colors.info, &defaults.app_colors.info);
        fill(&mut colors.neutral, &defaults.app_colors.neutral);

        for (key, color) in defaults.badge_colors {
            self.badge_colors.entry(key).or_insert(color);
        }
    }

    /// Apply early overrides (`PORT`, `LOG_LEVEL`); empty values are ignored
    pub fn apply_overrides(&mut self, port: Option<&str>, log_level: Option<&str>) {
        if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
            self.server.port = port.to_string();
        }
        if let Some(level) = log_level.map(str::trim).filter(|l| !l.is_empty()) {
            self.logging.level = level.to_string();
        }
    }

    /// `host:port` for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// `<data_dir>/<db_name>.db`
    pub fn database_path(&self) -> PathBuf {
        self.database
            .data_dir
            .join(format!("{}.db", self.database.db_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_badge_colors() {
        let config = Config::default();
        assert_eq!(config.badge_colors.get("year").map(String::as_str), Some("gray"));
        assert_eq!(config.badge_colors.get("active").map(String::as_str), Some("yellow"));
        assert_eq!(config.badge_colors.len(), 4);
    }

    #[test]
    fn test_bind_address_and_database_path() {
        let mut config = Config::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = "9000".to_string();
        config.database.data_dir = PathBuf::from("/tmp/homenet");
        config.database.db_name = "movies".to_string();

        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/homenet/movies.db"));
    }

    #[test]
    fn test_apply_overrides_ignores_empty_values() {
        let mut config = Config::default();
        config.apply_overrides(Some(""), Some("  "));
        assert_eq!(config.server.port, "8080");
        assert_eq!(config.logging.level, "INFO");

        config.apply_overrides(Some("3000"), Some("debug"));
        assert_eq!(config.server.port, "3000");
        assert_eq!(config.logging.level, "debug");
    }
}
