//! Session settings: a RON file, then command-line flags and the environment on top.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wizard_core::{DataSourceType, IndexingTechnique, WizardOptions};
use wizard_engine::ApiSettings;

const DEFAULT_CONFIG_FILE: &str = "wizard.ron";

/// Terminal driver for the dataset creation wizard.
#[derive(Debug, Parser)]
#[command(name = "dataset-wizard", version)]
pub struct Cli {
    /// RON configuration file. Defaults to `./wizard.ron` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Add documents to this existing dataset instead of creating a new one.
    #[arg(long)]
    pub dataset: Option<String>,

    /// Bearer token for the console API.
    #[arg(long, env = "WIZARD_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    /// Write to the configured log file only.
    #[default]
    File,
    Terminal,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub destination: LogDestination,
    pub level: String,
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            destination: LogDestination::File,
            level: "info".to_string(),
            file: PathBuf::from("./wizard.log"),
        }
    }
}

impl LogSettings {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.level.trim()).map_err(|_| ConfigError::LogLevel(self.level.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub dataset_id: Option<String>,
    pub default_indexing_technique: IndexingTechnique,
    pub initial_source: DataSourceType,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub log: LogSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            api_base_url: api.base_url,
            api_token: None,
            dataset_id: None,
            default_indexing_technique: IndexingTechnique::default(),
            initial_source: DataSourceType::default(),
            connect_timeout_secs: api.connect_timeout.as_secs(),
            request_timeout_secs: api.request_timeout.as_secs(),
            upload_timeout_secs: api.upload_timeout.as_secs(),
            log: LogSettings::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path`, or `./wizard.ron` when none is given.
    ///
    /// Only the implicit default file may be missing; it then yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Command-line flags and `WIZARD_API_TOKEN` win over the file.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(dataset_id) = &cli.dataset {
            self.dataset_id = Some(dataset_id.clone());
        }
        if let Some(token) = &cli.api_token {
            self.api_token = Some(token.clone());
        }
        self
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base_url.clone(),
            api_token: self.api_token.clone().filter(|token| !token.trim().is_empty()),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            upload_timeout: Duration::from_secs(self.upload_timeout_secs),
        }
    }

    pub fn wizard_options(&self) -> WizardOptions {
        WizardOptions {
            dataset_id: self.dataset_id.clone(),
            default_indexing_technique: self.default_indexing_technique,
            initial_source: self.initial_source,
        }
    }
}
