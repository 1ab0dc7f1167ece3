//! Configuration management for the concept exporter.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! The exporter reads a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CONCEPT_EXPORTER_<SECTION>_<KEY>` overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use concept_exporter::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("concept-exporter.toml")?;
//!
//! println!("Neo4j URL: {}", config.neo4j.base_url);
//! println!("S3 writer URL: {}", config.s3_writer.base_url);
//! println!("Concept types: {:?}", config.export.concept_types);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (name, system code, log level)
//! - [`ServerConfig`] - HTTP service settings
//! - [`Neo4jConfig`] - Graph database connection
//! - [`S3WriterConfig`] - Export RW S3 connection and retries
//! - [`ExportConfig`] - Supported concept types and URL base
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [neo4j]
//! base_url = "http://neo4j:7474"
//! username = "neo4j"
//! password = "${NEO4J_PASSWORD}"
//!
//! [s3_writer]
//! base_url = "http://concept-rw-s3:8080"
//!
//! [export]
//! concept_types = ["Brand", "Topic", "Location", "Person", "Organisation"]
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_from_env};
pub use schema::{
    ApplicationConfig, ExportConfig, ExporterConfig, LoggingConfig, Neo4jConfig, RetryConfig,
    S3WriterConfig, ServerConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
