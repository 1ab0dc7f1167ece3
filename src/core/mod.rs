//! Core business logic for the concept exporter.
//!
//! # Export Workflow
//!
//! 1. **Create job**: validate candidates and replace the finished job
//! 2. **Prepare**: allocate one CSV buffer per concept type, header first
//! 3. **Inquire**: one worker per type, fed by a background Neo4j reader
//! 4. **Drain**: consume each worker in turn into its buffer
//! 5. **Publish**: upload each finished buffer to the S3 writer
//!
//! # Example
//!
//! ```rust,no_run
//! use concept_exporter::config::load_config;
//! use concept_exporter::core::export::ExportService;
//! use concept_exporter::domain::TransactionId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("concept-exporter.toml")?;
//! let service = ExportService::from_config(&config)?;
//!
//! let job = service.run_export(&[], &TransactionId::generate()).await?;
//! println!("Failed: {:?}", job.failed);
//! # Ok(())
//! # }
//! ```

pub mod export;
