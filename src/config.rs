//! Application configuration
//!
//! Loaded from a TOML file; every section and field has a default so a
//! partial file (or none at all) still yields a runnable service.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::DatabaseConfig;
use crate::shared::errors::InfraError;
use crate::shared::RetryConfig;

const APP_DIR: &str = "berth-service";
const CONFIG_ENV: &str = "BERTH_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub security: SecuritySection,
    pub admin: AdminSection,
    pub notifications: NotificationsSection,
    pub allocation: AllocationSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Any SeaORM URL; SQLite by default
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub jwt_secret: String,
    pub jwt_issuer: String,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_issuer: "harbor-identity".to_string(),
        }
    }
}

/// Administrator seeded into the user directory on first start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSection {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl Default for AdminSection {
    fn default() -> Self {
        Self {
            id: "admin".to_string(),
            username: "admin".to_string(),
            email: "admin@port.local".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsSection {
    /// Relay in-app notifications to the mailer
    pub email_enabled: bool,
    pub sender: String,
    /// Prefix for action links in emails, e.g. `https://port.example.com`
    pub base_url: Option<String>,
    /// Concurrent mailer calls before the relay stops reading the bus
    pub max_in_flight_emails: usize,
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            email_enabled: true,
            sender: "no-reply@port.local".to_string(),
            base_url: None,
            max_in_flight_emails: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationSection {
    /// Attempts per workflow write when the optimistic version check loses
    pub max_write_attempts: u32,
    pub retry_initial_delay_ms: u64,
}

impl Default for AllocationSection {
    fn default() -> Self {
        Self {
            max_write_attempts: 5,
            retry_initial_delay_ms: 10,
        }
    }
}

impl AppConfig {
    /// Read and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| InfraError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        let config: AppConfig =
            toml::from_str(raw).map_err(|e| InfraError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.server.port == 0 {
            return Err(InfraError::Config("server.port must not be 0".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(InfraError::Config("database.url is required".into()));
        }
        if self.security.jwt_secret.trim().is_empty() {
            return Err(InfraError::Config("security.jwt_secret is required".into()));
        }
        if self.security.jwt_issuer.trim().is_empty() {
            return Err(InfraError::Config("security.jwt_issuer is required".into()));
        }
        if self.admin.id.trim().is_empty() || self.admin.username.trim().is_empty() {
            return Err(InfraError::Config(
                "admin.id and admin.username are required".into(),
            ));
        }
        if self.notifications.max_in_flight_emails == 0 {
            return Err(InfraError::Config(
                "notifications.max_in_flight_emails must be at least 1".into(),
            ));
        }
        if self.allocation.max_write_attempts == 0 {
            return Err(InfraError::Config(
                "allocation.max_write_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(
            self.security.jwt_secret.clone(),
            self.security.jwt_issuer.clone(),
        )
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.allocation.max_write_attempts,
            Duration::from_millis(self.allocation.retry_initial_delay_ms),
        )
    }
}

/// `$BERTH_CONFIG`, else `<config_dir>/berth-service/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9100

            [security]
            jwt_secret = "s3cret"

            [allocation]
            max_write_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.security.jwt_secret, "s3cret");
        assert_eq!(config.security.jwt_issuer, "harbor-identity");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.retry_config().max_attempts, 3);
        assert_eq!(config.address(), "0.0.0.0:9100");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(AppConfig::from_toml("[server]\nport = 0").is_err());
        assert!(AppConfig::from_toml("[security]\njwt_secret = \"  \"").is_err());
        assert!(AppConfig::from_toml("[allocation]\nmax_write_attempts = 0").is_err());
        assert!(AppConfig::from_toml("[notifications]\nmax_in_flight_emails = 0").is_err());
        assert!(AppConfig::from_toml("not toml at all = = =").is_err());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
