// Concept Exporter - Neo4j concepts to CSV files in S3
// Copyright (c) 2025 Concept Exporter Contributors
// Licensed under the MIT License

//! # Concept Exporter
//!
//! Exports every concept of the supported types from a Neo4j graph database
//! into one CSV file per type and uploads the files to the Export RW S3
//! service.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`web`] - HTTP service (`POST /export`, `GET /job`, health endpoints)
//! - [`core`] - Export jobs, workers and the drain loop
//! - [`adapters`] - Neo4j and S3 writer clients
//! - [`domain`] - Concepts, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use concept_exporter::config::load_config;
//! use concept_exporter::core::export::ExportService;
//! use concept_exporter::domain::TransactionId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("concept-exporter.toml")?;
//!     let service = ExportService::from_config(&config)?;
//!
//!     let tid = TransactionId::generate();
//!     let job = service.run_export(&["Brand".to_string()], &tid).await?;
//!
//!     println!("Exported {:?}, failed {:?}", job.progress, job.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Jobs
//!
//! Only one job is active at a time. A job fans out one worker per concept
//! type; each worker streams concepts from Neo4j into a CSV buffer, which
//! is uploaded once the worker's stream ends cleanly. A failing type is
//! recorded in the job's `Failed` list without stopping the others.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod web;
