//! Configuration for the training points module

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_ENV: &str = "TRAINING_POINTS_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/training_points.yaml";

/// Prefix of environment overrides, e.g. `TRAINING_POINTS_BIND_ADDR`
pub const ENV_PREFIX: &str = "TRAINING_POINTS_";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Training points module configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection string (postgres:// or sqlite:)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Upper bound of the connection pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Address the REST server listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Page size applied when a listing does not ask for one
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Largest page a listing may return
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            bind_addr: default_bind_addr(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load defaults, then the YAML file named by `TRAINING_POINTS_CONFIG`
    /// (if present), then `TRAINING_POINTS_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config: Config = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        // Yaml::file tolerates a missing file
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_connections == 0 {
            anyhow::bail!("max_connections must be at least 1");
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default_page_size must be between 1 and max_page_size ({})",
                self.max_page_size
            );
        }
        Ok(())
    }
}

fn default_database_url() -> String {
    "sqlite://training_points.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_page_size() -> u64 {
    20
}

fn default_max_page_size() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}
