//! Configuration schema types
//!
//! This module defines the configuration structure for the concept exporter.

use crate::config::SecretString;
use crate::domain::concept::DEFAULT_API_BASE_URL;
use crate::domain::ConceptType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Main exporter configuration
///
/// This is the root configuration structure that maps to the TOML file.
/// Every section has defaults, so an empty file is a valid local setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// HTTP service settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Neo4j connection settings
    #[serde(default)]
    pub neo4j: Neo4jConfig,

    /// Export RW S3 settings
    #[serde(default)]
    pub s3_writer: S3WriterConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ExporterConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.server.validate()?;
        self.neo4j.validate()?;
        self.s3_writer.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// System code reported by the health endpoint
    #[serde(default = "default_app_name")]
    pub system_code: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("application.name cannot be empty".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            system_code: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

/// HTTP service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bind_address.trim().is_empty() {
            return Err("server.bind_address cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("server.port must be > 0".to_string());
        }
        if self.request_timeout_seconds == 0 {
            return Err("server.request_timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }

    /// The `address:port` string to listen on
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

/// Neo4j connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Base URL of the Neo4j HTTP API
    #[serde(default = "default_neo4j_url")]
    pub base_url: String,

    /// Database name
    #[serde(default = "default_neo4j_database")]
    pub database: String,

    /// Username for basic authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic authentication (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Query timeout in seconds
    #[serde(default = "default_neo4j_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Neo4jConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_http_url("neo4j.base_url", &self.base_url)?;

        if self.database.trim().is_empty() {
            return Err("neo4j.database cannot be empty".to_string());
        }

        let has_username = self.username.as_ref().is_some_and(|u| !u.is_empty());
        let has_password = self
            .password
            .as_ref()
            .is_some_and(|p| !p.expose_secret().is_empty());
        if has_username != has_password {
            return Err(
                "neo4j.username and neo4j.password must be provided together".to_string(),
            );
        }

        if self.timeout_seconds == 0 {
            return Err("neo4j.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            base_url: default_neo4j_url(),
            database: default_neo4j_database(),
            username: None,
            password: None,
            timeout_seconds: default_neo4j_timeout_seconds(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err(format!(
                "s3_writer.retry.max_retries must be <= 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "s3_writer.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Export RW S3 configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3WriterConfig {
    /// Base URL of the S3 writer
    #[serde(default = "default_s3_writer_url")]
    pub base_url: String,

    /// Health URL of the S3 writer (defaults to `<base_url>/__gtg`)
    #[serde(default)]
    pub health_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_s3_writer_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl S3WriterConfig {
    fn validate(&self) -> Result<(), String> {
        validate_http_url("s3_writer.base_url", &self.base_url)?;
        if let Some(health_url) = &self.health_url {
            validate_http_url("s3_writer.health_url", health_url)?;
        }
        if self.timeout_seconds == 0 {
            return Err("s3_writer.timeout_seconds must be > 0".to_string());
        }
        self.retry.validate()
    }

    /// The effective health URL
    pub fn health_url(&self) -> String {
        self.health_url
            .clone()
            .unwrap_or_else(|| format!("{}/__gtg", self.base_url.trim_end_matches('/')))
    }
}

impl Default for S3WriterConfig {
    fn default() -> Self {
        Self {
            base_url: default_s3_writer_url(),
            health_url: None,
            timeout_seconds: default_s3_writer_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Concept types supported for export, in export order
    #[serde(default = "default_concept_types")]
    pub concept_types: Vec<String>,

    /// Base URL for generated concept ids and API URLs
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.concept_types.is_empty() {
            return Err("export.concept_types cannot be empty".to_string());
        }

        let mut seen = HashSet::new();
        for name in &self.concept_types {
            ConceptType::new(name.as_str()).map_err(|e| format!("export.concept_types: {e}"))?;
            if !seen.insert(name.as_str()) {
                return Err(format!(
                    "export.concept_types contains duplicate entry '{name}'"
                ));
            }
        }

        validate_http_url("export.api_base_url", &self.api_base_url)
    }

    /// The configured concept types as validated domain values
    ///
    /// Entries that fail validation are skipped; `validate` reports them.
    pub fn supported_concept_types(&self) -> Vec<ConceptType> {
        self.concept_types
            .iter()
            .filter_map(|name| ConceptType::new(name.as_str()).ok())
            .collect()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            concept_types: default_concept_types(),
            api_base_url: default_api_base_url(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Console output format (pretty or json)
    #[serde(default = "default_console_format")]
    pub console_format: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.console_format.as_str()) {
            return Err(format!(
                "Invalid logging.console_format '{}'. Must be one of: {}",
                self.console_format,
                valid_formats.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            console_format: default_console_format(),
        }
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    let parsed = url::Url::parse(value).map_err(|e| format!("{field} is not a valid URL: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("{field} must start with http:// or https://"));
    }
    Ok(())
}

// Default value functions

fn default_app_name() -> String {
    "concept-exporter".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_seconds() -> u64 {
    60
}

fn default_neo4j_url() -> String {
    "http://localhost:7474".to_string()
}

fn default_neo4j_database() -> String {
    "neo4j".to_string()
}

fn default_neo4j_timeout_seconds() -> u64 {
    300
}

fn default_s3_writer_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_s3_writer_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_concept_types() -> Vec<String> {
    ["Brand", "Topic", "Location", "Person", "Organisation"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_local_path() -> String {
    "/var/log/concept-exporter".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_console_format() -> String {
    "pretty".to_string()
}
