//! Domain models and types for the concept exporter.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ConceptType`], [`JobId`], [`TransactionId`])
//! - **The exported record** ([`Concept`])
//! - **Error types** ([`ExporterError`], [`SourceError`], [`PublishError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Concept types are validated on construction because they are interpolated
//! into graph queries:
//!
//! ```rust
//! use concept_exporter::domain::ConceptType;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let brand = ConceptType::new("Brand")?;
//! assert!(ConceptType::new("Brand Person").is_err());
//! # Ok(())
//! # }
//! ```

pub mod concept;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use concept::Concept;
pub use errors::{ExporterError, PublishError, SourceError};
pub use ids::{ConceptType, JobId, TransactionId};
pub use result::Result;
