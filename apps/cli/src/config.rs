//! Layered configuration: defaults, optional TOML file, then `SIEVE_*`
//! environment variables (`SIEVE_POSTGRES__DATA_COLUMN=doc`).

use std::path::Path;

use anyhow::Context;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;
use sieve_mongo::MongoOptions;
use sieve_postgres::SqlOptions;

const DEFAULT_CONFIG_FILE: &str = "sieve.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub mongo: MongoOptions,
    pub postgres: SqlOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from `path` (required when given) or `sieve.toml` (optional),
    /// with the environment layered on top. A `.env` file is read first.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let builder = config::Config::builder()
            .add_source(file)
            .add_source(environment());
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

fn environment() -> Environment {
    Environment::with_prefix("SIEVE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
