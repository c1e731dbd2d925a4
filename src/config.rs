// ABOUTME: Environment-driven server configuration
// ABOUTME: Reads the HTTP port, database url, media root, and log level with defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::warn;

use crate::constants::defaults;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// Runtime configuration for the BlockFit server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP API listens on
    pub http_port: u16,
    /// `SQLite` connection string
    pub database_url: String,
    /// Root directory for locally stored media files
    pub media_root: PathBuf,
    /// Log verbosity
    pub log_level: LogLevel,
    /// Comma-separated CORS origin allowlist; "*" permits any origin
    pub cors_allowed_origins: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but fails to parse
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {e}");
        }

        Ok(Self {
            http_port: env_var_or("HTTP_PORT", &defaults::HTTP_PORT.to_string())?
                .parse()
                .context("Invalid HTTP_PORT value")?,
            database_url: env_var_or("DATABASE_URL", defaults::DATABASE_URL)?,
            media_root: PathBuf::from(env_var_or("MEDIA_ROOT", defaults::MEDIA_ROOT)?),
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")?),
            cors_allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*")?,
        })
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> Result<String> {
    Ok(env::var(key).unwrap_or_else(|_| default.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_apply_when_env_is_empty() {
        env::remove_var("HTTP_PORT");
        env::remove_var("DATABASE_URL");
        env::remove_var("MEDIA_ROOT");
        env::remove_var("LOG_LEVEL");
        env::remove_var("CORS_ALLOWED_ORIGINS");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, defaults::HTTP_PORT);
        assert_eq!(config.database_url, defaults::DATABASE_URL);
        assert_eq!(config.media_root, PathBuf::from(defaults::MEDIA_ROOT));
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.cors_allowed_origins, "*");
    }

    #[test]
    #[serial]
    fn test_env_overrides_defaults() {
        env::set_var("HTTP_PORT", "9999");
        env::set_var("LOG_LEVEL", "debug");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 9999);
        assert_eq!(config.log_level, LogLevel::Debug);

        env::remove_var("HTTP_PORT");
        env::remove_var("LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_an_error() {
        env::set_var("HTTP_PORT", "not-a-port");
        assert!(ServerConfig::from_env().is_err());
        env::remove_var("HTTP_PORT");
    }

    #[test]
    fn test_log_level_lenient_parse() {
        assert_eq!(LogLevel::from_str_or_default("TRACE"), LogLevel::Trace);
        assert_eq!(LogLevel::from_str_or_default("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("nonsense"), LogLevel::Info);
    }
}
