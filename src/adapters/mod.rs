//! External system integrations for the concept exporter.
//!
//! - [`neo4j`] - Graph database source of concepts
//! - [`s3writer`] - Export RW S3 publisher for finished CSV files
//! - [`traits`] - The seams the export core depends on
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the export core
//! can be exercised with in-memory implementations.
//!
//! ```rust,no_run
//! use concept_exporter::adapters::neo4j::Neo4jClient;
//! use concept_exporter::adapters::s3writer::S3WriterClient;
//! use concept_exporter::config::ExporterConfig;
//!
//! # fn example() -> concept_exporter::domain::Result<()> {
//! let config = ExporterConfig::default();
//! let source = Neo4jClient::new(&config.neo4j, config.export.api_base_url.clone())?;
//! let publisher = S3WriterClient::new(&config.s3_writer)?;
//! # Ok(())
//! # }
//! ```

pub mod neo4j;
pub mod s3writer;
pub mod traits;

pub use traits::{ArtifactPublisher, ConceptSource, HealthCheck, ReadOutcome};
