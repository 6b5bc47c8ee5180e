//! Layered application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, `enrollment.toml`,
//! `ENROLLMENT_*` variables (nested keys split on `__`), then the bare
//! `DATABASE_URL` variable. A `.env` file is loaded into the environment
//! before any of them are read.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::tabular::IngestConfig;

pub const CONFIG_FILE: &str = "enrollment.toml";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/university.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the four entity files
    pub data_dir: PathBuf,
    /// Chart HTML files and the summary report
    pub output_dir: PathBuf,
    /// Joined table export
    pub processed_dir: PathBuf,
    pub database_url: String,
    pub log_level: String,
    pub ingest: IngestConfig,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("data").join("visualizations"),
            processed_dir: PathBuf::from("data").join("processed"),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: "info".to_string(),
            ingest: IngestConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.ingest
            .validate()
            .map_err(|e| AppError::ConfigError(format!("ingest: {}", e)))?;
        if self.database_url.trim().is_empty() {
            return Err(AppError::ConfigError("database_url must not be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(AppError::ConfigError("server.port must be > 0".to_string()));
        }
        Ok(())
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Load `.env`, then extract and validate the layered configuration
    pub fn load(config_file: Option<&Path>) -> Result<AppConfig> {
        let _ = dotenvy::dotenv();
        let file = config_file.unwrap_or_else(|| Path::new(CONFIG_FILE));
        Self::extract(Self::figment(file))
    }

    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("ENROLLMENT_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn extract(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
