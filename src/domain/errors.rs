//! Domain error types
//!
//! This module defines the error hierarchy for the concept exporter.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main exporter error type
///
/// This is the primary error type used throughout the application.
/// It wraps the adapter-specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors reading concepts from the data source
    #[error("{0}")]
    Source(#[from] SourceError),

    /// Errors publishing an artifact
    #[error("{0}")]
    Publish(#[from] PublishError),

    /// CSV encoding errors
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// An export job is already in progress
    #[error("There are already running export jobs. Please wait them to finish")]
    JobAlreadyRunning,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Concept source errors
///
/// Errors that occur while querying the graph database for a concept type.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to reach the database
    #[error("Failed to connect to Neo4j: {0}")]
    ConnectionFailed(String),

    /// The query was rejected or failed while executing
    #[error("Neo4j query failed: {0}")]
    QueryFailed(String),

    /// The response could not be interpreted
    #[error("Invalid response from Neo4j: {0}")]
    InvalidResponse(String),

    /// The query succeeded but returned no concepts
    #[error("Reading {concept_type} concept type from Neo4j returned empty result")]
    EmptyResult { concept_type: String },
}

/// Artifact publishing errors
///
/// Errors that occur when uploading a finished CSV file to the S3 writer.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Failed to reach the S3 writer
    #[error("Failed to connect to Export RW S3: {0}")]
    ConnectionFailed(String),

    /// The request could not be built
    #[error("Invalid upload request: {0}")]
    InvalidRequest(String),

    /// The S3 writer answered with a non-success status
    #[error("Export RW S3 returned HTTP {status}")]
    UnexpectedStatus { status: u16 },
}

impl PublishError {
    /// Whether another attempt could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            PublishError::ConnectionFailed(_) => true,
            PublishError::UnexpectedStatus { status } => *status >= 500,
            PublishError::InvalidRequest(_) => false,
        }
    }
}

impl From<std::io::Error> for ExporterError {
    fn from(err: std::io::Error) -> Self {
        ExporterError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ExporterError {
    fn from(err: serde_json::Error) -> Self {
        ExporterError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ExporterError {
    fn from(err: toml::de::Error) -> Self {
        ExporterError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for ExporterError {
    fn from(err: csv::Error) -> Self {
        ExporterError::Encoding(err.to_string())
    }
}
