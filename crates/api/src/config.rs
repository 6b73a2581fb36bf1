//! Server configuration.
//!
//! Loads configuration from environment variables (and a `.env` file, if
//! present) with defaults suitable for local development.

use std::env;
use std::path::PathBuf;

use checkin_observability::LogFormat;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Listener configuration
    pub server: ServerConfig,

    /// Path of the archive database file
    pub archive_path: PathBuf,

    /// Redis connection URL. When unset, events go to an in-memory publisher.
    pub redis_url: Option<String>,

    /// Log output format
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            archive_path: PathBuf::from("checkin.redb"),
            redis_url: None,
            log_format: LogFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("CHECKIN_HOST").unwrap_or(defaults.server.host);
        let port = match lookup("CHECKIN_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "CHECKIN_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.server.port,
        };

        let archive_path = lookup("CHECKIN_ARCHIVE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.archive_path);

        let redis_url = lookup("CHECKIN_REDIS_URL").filter(|url| !url.trim().is_empty());

        let log_format = match lookup("CHECKIN_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                key: "CHECKIN_LOG_FORMAT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.log_format,
        };

        Ok(Self {
            server: ServerConfig { host, port },
            archive_path,
            redis_url,
            log_format,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            archive_path: env::temp_dir().join("checkin-test.redb"),
            redis_url: None,
            log_format: LogFormat::Pretty,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            ("CHECKIN_HOST", "127.0.0.1"),
            ("CHECKIN_PORT", "9001"),
            ("CHECKIN_ARCHIVE_PATH", "/var/lib/checkin/archive.redb"),
            ("CHECKIN_REDIS_URL", "redis://localhost:6379"),
            ("CHECKIN_LOG_FORMAT", "pretty"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:9001");
        assert_eq!(config.archive_path, PathBuf::from("/var/lib/checkin/archive.redb"));
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn blank_redis_url_means_in_memory() {
        let config = Config::from_lookup(lookup(&[("CHECKIN_REDIS_URL", "  ")])).unwrap();
        assert_eq!(config.redis_url, None);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[("CHECKIN_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CHECKIN_PORT", .. }));
    }

    #[test]
    fn invalid_log_format_is_rejected() {
        let err = Config::from_lookup(lookup(&[("CHECKIN_LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CHECKIN_LOG_FORMAT", .. }));
    }

    #[test]
    fn test_config_binds_ephemeral_port() {
        let config = Config::test();
        assert_eq!(config.bind_addr(), "127.0.0.1:0");
        assert!(config.redis_url.is_none());
    }
}
