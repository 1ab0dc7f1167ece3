//! Export service: configuration wiring and request-level operations
//!
//! Shared by the HTTP handlers and the `export` command.

use super::encoder::CsvExporter;
use super::exporter::FullExporter;
use super::inquirer::SourceInquirer;
use super::job::JobSnapshot;
use crate::adapters::neo4j::Neo4jClient;
use crate::adapters::s3writer::S3WriterClient;
use crate::adapters::traits::HealthCheck;
use crate::config::ExporterConfig;
use crate::domain::{ConceptType, ExporterError, JobId, Result, TransactionId};
use std::sync::Arc;

/// The exporter together with the supported concept types and the
/// dependencies it reports health for
pub struct ExportService {
    exporter: Arc<FullExporter>,
    supported: Vec<ConceptType>,
    health_checks: Vec<Arc<dyn HealthCheck>>,
}

impl ExportService {
    pub fn new(
        exporter: Arc<FullExporter>,
        supported: Vec<ConceptType>,
        health_checks: Vec<Arc<dyn HealthCheck>>,
    ) -> Self {
        Self {
            exporter,
            supported,
            health_checks,
        }
    }

    /// Wires the Neo4j source, the S3 writer and the CSV encoder
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be built.
    pub fn from_config(config: &ExporterConfig) -> Result<Self> {
        let neo4j = Arc::new(Neo4jClient::new(
            &config.neo4j,
            config.export.api_base_url.clone(),
        )?);
        let s3_writer = Arc::new(S3WriterClient::new(&config.s3_writer)?);

        let exporter = FullExporter::new(
            Arc::new(SourceInquirer::new(neo4j.clone())),
            s3_writer.clone(),
            Box::new(CsvExporter::new()),
        );

        let health_checks = vec![neo4j as Arc<dyn HealthCheck>, s3_writer];

        Ok(Self::new(
            Arc::new(exporter),
            config.export.supported_concept_types(),
            health_checks,
        ))
    }

    pub fn exporter(&self) -> &Arc<FullExporter> {
        &self.exporter
    }

    pub fn supported(&self) -> &[ConceptType] {
        &self.supported
    }

    pub fn health_checks(&self) -> &[Arc<dyn HealthCheck>] {
        &self.health_checks
    }

    /// Splits requested names into supported candidates and a message
    /// naming the unsupported ones
    ///
    /// An empty selection means every supported type. Repeated names keep
    /// their first position.
    pub fn candidates(&self, requested: &[String], tid: &TransactionId) -> (Vec<ConceptType>, String) {
        let mut unique: Vec<&String> = Vec::with_capacity(requested.len());
        for name in requested {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }

        let (candidates, unsupported): (Vec<&String>, Vec<&String>) = unique
            .into_iter()
            .partition(|name| self.supported.iter().any(|s| s.as_str() == name.as_str()));

        let error_message = if unsupported.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = unsupported.iter().map(|s| s.as_str()).collect();
            format!(
                "There are unsupported concept types within the candidates: [{}]",
                names.join(" ")
            )
        };

        let mut candidates: Vec<ConceptType> = candidates
            .into_iter()
            .filter_map(|name| ConceptType::new(name.as_str()).ok())
            .collect();

        if candidates.is_empty() {
            tracing::info!(
                transaction_id = %tid,
                supported = ?self.supported,
                "Concept type candidates are empty. Using all supported ones"
            );
            candidates = self.supported.clone();
        }

        (candidates, error_message)
    }

    /// Creates a job and runs it on a background task
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::JobAlreadyRunning`] when a job is active.
    pub fn start_export(&self, requested: &[String], tid: &TransactionId) -> Result<JobSnapshot> {
        if self.exporter.is_running_job() {
            return Err(ExporterError::JobAlreadyRunning);
        }

        let (candidates, error_message) = self.candidates(requested, tid);
        let job = self.exporter.create_job(candidates, error_message)?;

        let pending = AbandonOnDrop {
            exporter: Arc::clone(&self.exporter),
            job_id: job.id.clone(),
        };
        let tid = tid.clone();
        tokio::spawn(async move {
            pending.exporter.run_full_export(&tid).await;
        });

        Ok(job)
    }

    /// Creates a job and runs it to completion, returning the final snapshot
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::JobAlreadyRunning`] when a job is active.
    pub async fn run_export(&self, requested: &[String], tid: &TransactionId) -> Result<JobSnapshot> {
        let (candidates, error_message) = self.candidates(requested, tid);
        let created = self.exporter.create_job(candidates, error_message)?;
        self.exporter.run_full_export(tid).await;
        Ok(self.exporter.current_job().unwrap_or(created))
    }
}

/// Finishes a job whose background task is dropped before it runs
struct AbandonOnDrop {
    exporter: Arc<FullExporter>,
    job_id: JobId,
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        self.exporter.abandon(&self.job_id);
    }
}
