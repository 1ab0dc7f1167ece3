//! Adapter traits
//!
//! These traits define the seams between the export core and the external
//! systems it reads from and publishes to.

use crate::domain::{Concept, ConceptType, Result, TransactionId};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Outcome of a successful read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The query matched this many concepts; they are being streamed to the sink
    Found(usize),

    /// The query succeeded but matched nothing
    Empty,
}

/// A source of concepts, queried once per concept type
#[async_trait]
pub trait ConceptSource: Send + Sync {
    /// Reads every concept of `concept_type` into `sink`
    ///
    /// The sink is owned by the call and closes once it is dropped. On
    /// `Found(n)` exactly `n` concepts are sent, possibly after this method
    /// returns. On `Empty` or an error, nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::domain::SourceError`] when the query cannot be run
    /// or its response cannot be interpreted.
    async fn read(
        &self,
        concept_type: &ConceptType,
        sink: mpsc::Sender<Concept>,
    ) -> Result<ReadOutcome>;
}

/// Destination for finished export artifacts
#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    /// Uploads `bytes` under `file_name`
    ///
    /// # Errors
    ///
    /// Returns a [`crate::domain::PublishError`] if the upload did not succeed.
    async fn upload(&self, bytes: Vec<u8>, file_name: &str, tid: &TransactionId) -> Result<()>;
}

/// A dependency whose reachability is reported by the health endpoints
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Short name shown in health reports
    fn name(&self) -> &str;

    /// Checks connectivity, returning a human readable status on success
    async fn check_health(&self) -> Result<String>;
}
