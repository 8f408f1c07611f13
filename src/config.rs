//! Configuration resolution for proposal-ingest
//!
//! Two knobs: bind address and database path. Resolution priority is
//! ENV → TOML → default; the TOML file location itself can be overridden
//! with `PROPOSAL_INGEST_CONFIG`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the HTTP server listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Path of the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_bind_address() -> String {
    "127.0.0.1:5780".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("proposals.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_path: default_database_path(),
        }
    }
}

impl Config {
    /// Load configuration with ENV → TOML → default priority.
    pub fn load() -> Result<Config> {
        let config_path = std::env::var("PROPOSAL_INGEST_CONFIG")
            .unwrap_or_else(|_| "proposal-ingest.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_path))?;
            info!("Configuration loaded from {}", config_path);
            config
        } else {
            Config::default()
        };

        if let Ok(bind) = std::env::var("PROPOSAL_INGEST_BIND") {
            config.bind_address = bind;
        }
        if let Ok(db) = std::env::var("PROPOSAL_INGEST_DB") {
            config.database_path = PathBuf::from(db);
        }

        Ok(config)
    }
}
