//! Configuration management
//!
//! This module handles loading and parsing configuration for the dealership backend
//! and the sentiment analyzer service. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings, `.env` is honoured)
//!
//! Missing optional values are filled with local development defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Downstream service configuration
    #[serde(default)]
    pub services: ServicesConfig,
    /// Sentiment analyzer service configuration
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/dealership.db".to_string()
}

/// Base URLs and limits for the external services this backend calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Dealership / review service
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Sentiment analyzer service
    #[serde(default = "default_sentiment_analyzer_url")]
    pub sentiment_analyzer_url: String,
    /// Car inventory search service
    #[serde(default = "default_searchcars_url")]
    pub searchcars_url: String,
    /// Timeout applied to every outbound request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Maximum number of in-flight sentiment calls per review listing
    #[serde(default = "default_review_concurrency")]
    pub review_concurrency: usize,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            sentiment_analyzer_url: default_sentiment_analyzer_url(),
            searchcars_url: default_searchcars_url(),
            request_timeout_secs: default_request_timeout_secs(),
            review_concurrency: default_review_concurrency(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:3030".to_string()
}

fn default_sentiment_analyzer_url() -> String {
    "http://localhost:5050/".to_string()
}

fn default_searchcars_url() -> String {
    "http://localhost:3050/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_review_concurrency() -> usize {
    8
}

/// Bind address of the standalone sentiment analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_analyzer_port")]
    pub port: u16,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_analyzer_port(),
        }
    }
}

fn default_analyzer_port() -> u16 {
    5050
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - DEALERSHIP_SERVER_HOST / DEALERSHIP_SERVER_PORT / DEALERSHIP_SERVER_CORS_ORIGIN
    /// - DEALERSHIP_DATABASE_URL
    /// - DEALERSHIP_BACKEND_URL (fallback: `backend_url`)
    /// - DEALERSHIP_SENTIMENT_ANALYZER_URL (fallback: `sentiment_analyzer_url`)
    /// - DEALERSHIP_SEARCHCARS_URL (fallback: `searchcars_url`)
    /// - DEALERSHIP_REQUEST_TIMEOUT_SECS / DEALERSHIP_REVIEW_CONCURRENCY
    /// - DEALERSHIP_ANALYZER_HOST / DEALERSHIP_ANALYZER_PORT
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("DEALERSHIP_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("DEALERSHIP_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("DEALERSHIP_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("DEALERSHIP_DATABASE_URL") {
            self.database.url = url;
        }

        if let Some(url) = env_with_fallback("DEALERSHIP_BACKEND_URL", "backend_url") {
            self.services.backend_url = url;
        }
        if let Some(url) =
            env_with_fallback("DEALERSHIP_SENTIMENT_ANALYZER_URL", "sentiment_analyzer_url")
        {
            self.services.sentiment_analyzer_url = url;
        }
        if let Some(url) = env_with_fallback("DEALERSHIP_SEARCHCARS_URL", "searchcars_url") {
            self.services.searchcars_url = url;
        }
        if let Ok(secs) = std::env::var("DEALERSHIP_REQUEST_TIMEOUT_SECS") {
            // A zero timeout would fail every call
            if let Some(secs) = secs.parse::<u64>().ok().filter(|secs| *secs > 0) {
                self.services.request_timeout_secs = secs;
            }
        }
        if let Ok(limit) = std::env::var("DEALERSHIP_REVIEW_CONCURRENCY") {
            if let Ok(limit) = limit.parse::<usize>() {
                self.services.review_concurrency = limit;
            }
        }

        if let Ok(host) = std::env::var("DEALERSHIP_ANALYZER_HOST") {
            self.analyzer.host = host;
        }
        if let Ok(port) = std::env::var("DEALERSHIP_ANALYZER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.analyzer.port = port;
            }
        }
    }
}

fn env_with_fallback(primary: &str, legacy: &str) -> Option<String> {
    std::env::var(primary)
        .or_else(|_| std::env::var(legacy))
        .ok()
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
