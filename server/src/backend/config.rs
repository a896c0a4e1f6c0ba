//! # Configuration
//!
//! Process configuration, resolved once at startup:
//! built-in defaults, then the optional YAML file named by
//! `REPORT_SERVER_CONFIG`, then individual environment overrides.
//!
//! Values are not validated here. A bad logo URL or mail token only shows up
//! when a report is rendered or sent.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::backend::io::email::MailtrapConfig;
use crate::backend::storage::BackoffPolicy;

pub const CONFIG_PATH_VAR: &str = "REPORT_SERVER_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub backoff: BackoffPolicy,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://daily_report.db".to_string(),
            backoff: BackoffPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Ledger read on every run, also attached to every report
    pub transactions_file_path: PathBuf,
    pub email_logo_url: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            transactions_file_path: PathBuf::from("transactions.csv"),
            email_logo_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub report: ReportConfig,
    pub mailtrap: MailtrapConfig,
    /// Account emails upserted at startup
    pub seed_accounts: Vec<String>,
}

impl AppConfig {
    /// Resolve configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_yaml_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // an empty document deserializes to unit, not to a default struct
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Overwrite fields whose variable `lookup` returns. Empty values count
    /// as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(value) = get("TRANSACTIONS_FILE_PATH") {
            self.report.transactions_file_path = PathBuf::from(value);
        }
        if let Some(value) = get("EMAIL_LOGO_URL") {
            self.report.email_logo_url = value;
        }
        if let Some(value) = get("MAILTRAP_HOST") {
            self.mailtrap.host = value;
        }
        if let Some(value) = get("MAILTRAP_TOKEN") {
            self.mailtrap.token = value;
        }
        if let Some(value) = get("MAILTRAP_FROM_EMAIL") {
            self.mailtrap.from_email = value;
        }
        if let Some(value) = get("DATABASE_URL").or_else(|| get("DATABASE_DSN")) {
            self.database.url = value;
        }
        if let Some(value) = get("BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = get("SEED_ACCOUNT_EMAILS") {
            self.seed_accounts = value
                .split(',')
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}
