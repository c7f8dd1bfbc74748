//! Configuration module
//!
//! Loaded from a TOML file (default `~/.config/btc-tx-service/config.toml`).
//! Every key is optional; missing keys fall back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("btc-tx-service")
        .join("config.toml")
}

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
    /// Seconds before a request is answered with 408
    pub request_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            shutdown_timeout: 30,
            request_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, used when `RUST_LOG` is unset
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Fixed-window request quota per client address
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 15 * 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// `["*"]` allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl AppConfig {
    /// Read, parse and validate a config file, then apply env overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// `DATABASE_URL` and `PORT` take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("PORT").ok(),
        );
    }

    fn apply_overrides(&mut self, database_url: Option<String>, port: Option<String>) {
        if let Some(url) = database_url.filter(|u| !u.is_empty()) {
            self.database.url = url;
        }
        if let Some(port) = port.and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.server.request_timeout == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout must be at least 1".into(),
            ));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_requests must be at least 1".into(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.window_secs must be at least 1".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".into(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(
                "database.min_connections exceeds database.max_connections".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.rate_limit.max_requests, 100);
        assert_eq!(cfg.rate_limit.window_secs, 900);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.cors.allowed_origins, vec!["*"]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            port = 8080

            [database]
            url = "postgres://u:p@db/btc"
            max_connections = 5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.database.url, "postgres://u:p@db/btc");
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.database.min_connections, 1);
        assert_eq!(cfg.logging.format, "json");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn rejects_zero_quota() {
        let cfg = AppConfig::from_toml("[rate_limit]\nmax_requests = 0").unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_request_timeout() {
        let cfg = AppConfig::from_toml("[server]\nrequest_timeout = 0").unwrap();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid(msg)) if msg.contains("request_timeout")
        ));
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let cfg =
            AppConfig::from_toml("[database]\nmin_connections = 10\nmax_connections = 2").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_toml("[server\nport = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(
            Some("postgres://override/btc".to_string()),
            Some("9999".to_string()),
        );
        assert_eq!(cfg.database.url, "postgres://override/btc");
        assert_eq!(cfg.server.port, 9999);

        cfg.apply_overrides(Some(String::new()), Some("not-a-port".to_string()));
        assert_eq!(cfg.database.url, "postgres://override/btc");
        assert_eq!(cfg.server.port, 9999);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AppConfig::load(Path::new("/nonexistent/btc-tx-service.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
