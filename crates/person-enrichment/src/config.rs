use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonConfig {
    /// Person store connection settings
    pub database: DatabaseConfig,

    /// Prediction provider endpoints
    pub lookup: LookupConfig,
}

/// Load a `.env` file from the working directory or its parents, if any
pub fn load_dotenv() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

/// PostgreSQL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parts
    pub url: Option<String>,

    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,

    /// One of disable, allow, prefer, require, verify-ca, verify-full
    pub ssl_mode: String,

    /// Pool size
    pub max_connections: u32,

    /// Seconds a request waits for a pooled connection
    pub acquire_timeout_secs: u64,

    /// Seconds startup keeps retrying before giving up on the database
    pub startup_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5433,
            name: "person_db".to_string(),
            user: "person_user".to_string(),
            password: "person_password".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 5,
            startup_timeout_secs: 120,
        }
    }
}

impl DatabaseConfig {
    /// Build sqlx connect options
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url)
                .map_err(|e| Error::Config(format!("Invalid database URL: {}", e)));
        }

        let ssl_mode = PgSslMode::from_str(&self.ssl_mode)
            .map_err(|e| Error::Config(format!("Invalid SSL mode {}: {}", self.ssl_mode, e)))?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(ssl_mode))
    }
}

/// Prediction provider base URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Age provider
    pub agify_url: String,

    /// Gender provider
    pub genderize_url: String,

    /// Nationality provider
    pub nationalize_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            agify_url: "https://api.agify.io".to_string(),
            genderize_url: "https://api.genderize.io".to_string(),
            nationalize_url: "https://api.nationalize.io".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PersonConfig::default();
        assert_eq!(config.database.port, 5433);
        assert_eq!(config.database.name, "person_db");
        assert_eq!(config.database.acquire_timeout_secs, 5);
        assert_eq!(config.database.startup_timeout_secs, 120);
        assert_eq!(config.lookup.agify_url, "https://api.agify.io");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PersonConfig = serde_json::from_str(
            r#"{"lookup": {"agify_url": "http://localhost:9000"}, "database": {"port": 5432}}"#,
        )
        .unwrap();

        assert_eq!(config.lookup.agify_url, "http://localhost:9000");
        assert_eq!(config.lookup.genderize_url, "https://api.genderize.io");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.host, "localhost");
    }

    #[test]
    fn test_connect_options() {
        let config = DatabaseConfig::default();
        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("person_db"));

        let bad_ssl = DatabaseConfig {
            ssl_mode: "sometimes".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad_ssl.connect_options(), Err(Error::Config(_))));

        let by_url = DatabaseConfig {
            url: Some("postgres://u:p@db.internal:6000/people".to_string()),
            ..Default::default()
        };
        let options = by_url.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6000);
    }
}
