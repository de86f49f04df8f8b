use core::fmt::{Debug, Display};
use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "hospitality.toml";
pub const ENV_PREFIX: &str = "HOSPITALITY_";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// JSON file with the guests, rooms, groups and cancellations of one event.
    pub scenario: PathBuf,
    /// `tracing_subscriber::EnvFilter` directives, `RUST_LOG` still wins.
    pub log_filter: String,
    /// Seat every unassigned guest before writing the result.
    pub auto_fill: bool,
    /// Pretty print the JSON result.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from("scenario.json"),
            log_filter: "info".to_owned(),
            auto_fill: true,
            pretty: false,
        }
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[must_use]
pub fn figment() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}
