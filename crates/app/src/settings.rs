//! Application settings.
//!
//! Values are read from an optional `settings.toml` in the working directory
//! and overridden by `SADAQAH_*` environment variables, with `__` between
//! nested keys (e.g. `SADAQAH_SERVER__PORT=8080`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Sweeper {
    pub enabled: bool,
    pub interval_hours: u64,
    pub hold_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub sweeper: Sweeper,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("SADAQAH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .set_default("sweeper.enabled", true)?
            .set_default("sweeper.interval_hours", 24)?
            .set_default("sweeper.hold_days", 7)
    }
}
