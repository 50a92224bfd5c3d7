use std::str::FromStr;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::sqlite::SqliteConnectOptions;

const IN_MEMORY: &str = ":memory:";
/// Connection variables of networked drivers. SQLite has no use for them.
const NETWORK_VARS: [&str; 3] = ["DB_HOST", "DB_USER", "DB_PASSWORD"];

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[serde(alias = "sqlite3")]
    Sqlite,
}

#[derive(Deserialize, Debug)]
pub struct DatabaseSettings {
    pub driver: DatabaseDriver,
    /// File path for SQLite, `:memory:` for a private in-memory database.
    pub name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn in_memory() -> Self {
        Self {
            driver: DatabaseDriver::Sqlite,
            name: IN_MEMORY.to_owned(),
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.name == IN_MEMORY
    }

    pub fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        match self.driver {
            DatabaseDriver::Sqlite if self.is_in_memory() => {
                SqliteConnectOptions::from_str("sqlite::memory:")
            }
            DatabaseDriver::Sqlite => Ok(SqliteConnectOptions::new()
                .filename(&self.name)
                .create_if_missing(true)),
        }
    }
}

/// Reads settings from defaults, an optional `configuration` file, `TRIVIA_*`
/// variables and finally the plain `DB_TYPE` and `DB_NAME` variables.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();

    let ignored = ignored_network_vars(legacy_var);
    if !ignored.is_empty() {
        tracing::warn!(?ignored, "Connection variables are not used by the sqlite driver");
    }

    Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 5000)?
        .set_default("database.driver", "sqlite")?
        .set_default("database.name", "trivia.db")?
        .set_default("database.max_connections", 5)?
        .add_source(File::with_name("configuration").required(false))
        .add_source(
            Environment::with_prefix("TRIVIA")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("database.driver", legacy_var("DB_TYPE"))?
        .set_override_option("database.name", legacy_var("DB_NAME"))?
        .build()?
        .try_deserialize()
}

fn legacy_var(key: &str) -> Option<String> {
    dotenv::var(key).ok().filter(|value| !value.is_empty())
}

fn ignored_network_vars(lookup: impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
    NETWORK_VARS
        .into_iter()
        .filter(|key| lookup(key).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_settings_deserialize_from_strings() {
        let settings: DatabaseSettings = serde_json::from_value(serde_json::json!({
            "driver": "sqlite3",
            "name": "trivia.db",
            "max_connections": "3"
        }))
        .unwrap();

        assert_eq!(settings.driver, DatabaseDriver::Sqlite);
        assert_eq!(settings.max_connections, 3);
        assert!(!settings.is_in_memory());
    }

    #[test]
    fn networked_keys_in_old_files_still_load() {
        let settings: DatabaseSettings = serde_json::from_value(serde_json::json!({
            "driver": "sqlite",
            "host": "localhost",
            "user": "student",
            "password": "hunter2",
            "name": ":memory:",
            "max_connections": 1
        }))
        .unwrap();
        assert!(settings.is_in_memory());
    }

    #[test]
    fn reports_network_vars_that_are_set() {
        let ignored = ignored_network_vars(|key| match key {
            "DB_HOST" => Some("db.internal".to_owned()),
            "DB_PASSWORD" => Some("hunter2".to_owned()),
            _ => None,
        });
        assert_eq!(ignored, vec!["DB_HOST", "DB_PASSWORD"]);
        assert!(ignored_network_vars(|_| None).is_empty());
    }

    #[test]
    fn unknown_driver_is_rejected() {
        let result = serde_json::from_value::<DatabaseSettings>(serde_json::json!({
            "driver": "postgres",
            "name": "trivia",
            "max_connections": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn application_address() {
        let app = ApplicationSettings {
            host: "127.0.0.1".to_owned(),
            port: 5000,
        };
        assert_eq!(app.address(), "127.0.0.1:5000");
    }
}
