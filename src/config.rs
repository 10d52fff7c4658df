//! Process configuration, read once at startup.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::backend::StoreConfig;
use crate::error::ConfigError;

pub const ENV_UPSERT_MODE: &str = "RAGVEC_UPSERT_MODE";
pub const ENV_PARALLEL_THRESHOLD: &str = "RAGVEC_PARALLEL_THRESHOLD";
pub const ENV_BIND: &str = "RAGVEC_BIND";
pub const ENV_LOG: &str = "RAGVEC_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:7878".to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub server: ServerConfig,
    /// `tracing_subscriber::EnvFilter` directive, `info` when unset.
    pub log_filter: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(mode) = lookup(ENV_UPSERT_MODE) {
            config.store.upsert_mode = parse_value(ENV_UPSERT_MODE, &mode)?;
        }
        if let Some(threshold) = lookup(ENV_PARALLEL_THRESHOLD) {
            config.store.parallel_threshold = parse_value(ENV_PARALLEL_THRESHOLD, &threshold)?;
        }
        if let Some(bind) = lookup(ENV_BIND) {
            config.server.bind = bind;
        }
        if let Some(directive) = lookup(ENV_LOG) {
            EnvFilter::try_new(&directive).map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG.to_string(),
                value: directive.clone(),
            })?;
            config.log_filter = Some(directive);
        }

        Ok(config)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
