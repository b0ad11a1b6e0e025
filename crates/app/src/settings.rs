//! Application settings, read from `settings.toml`.
//!
//! See `settings.toml` at the repository root for a commented example.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    /// In-memory SQLite, lost on shutdown. Useful for demos and tests.
    Memory,
    /// SQLite file at the given path, created when missing.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter applied to all crates (`error`..`trace`).
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }

    #[cfg(test)]
    fn from_str(raw: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_database() {
        let settings = Settings::from_str(
            r#"
            [app]
            level = "info"

            [server]
            database = { sqlite = "./splitmint.db" }
            bind = "0.0.0.0"
            port = 3000
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 3000);
        assert!(matches!(settings.server.database, Database::Sqlite(path) if path == "./splitmint.db"));
    }

    #[test]
    fn parses_memory_database() {
        let settings = Settings::from_str(
            r#"
            [app]
            level = "debug"

            [server]
            database = "memory"
            port = 8080
            "#,
        )
        .unwrap();

        assert!(matches!(settings.server.database, Database::Memory));
        assert!(settings.server.bind.is_none());
    }
}
