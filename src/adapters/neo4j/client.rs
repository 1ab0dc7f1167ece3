//! Neo4j concept source
//!
//! Queries the Neo4j HTTP transactional endpoint, one statement per concept
//! type, and streams the matched concepts to the caller's channel.

use super::models::{ConceptRow, StatementResult, TxRequest, TxResponse};
use super::queries::statement_for;
use crate::adapters::traits::{ConceptSource, HealthCheck, ReadOutcome};
use crate::config::Neo4jConfig;
use crate::domain::{Concept, ConceptType, ExporterError, Result, SourceError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::sync::mpsc;

/// Neo4j HTTP client
///
/// # Example
///
/// ```no_run
/// use concept_exporter::adapters::neo4j::Neo4jClient;
/// use concept_exporter::config::Neo4jConfig;
/// use concept_exporter::domain::concept::DEFAULT_API_BASE_URL;
///
/// # fn example() -> concept_exporter::domain::Result<()> {
/// let client = Neo4jClient::new(&Neo4jConfig::default(), DEFAULT_API_BASE_URL)?;
/// # Ok(())
/// # }
/// ```
pub struct Neo4jClient {
    client: Client,
    commit_url: String,
    auth_header: Option<String>,
    api_base_url: String,
}

impl Neo4jClient {
    /// Creates a client for the configured database
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Neo4jConfig, api_base_url: impl Into<String>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        let commit_url = format!(
            "{}/db/{}/tx/commit",
            config.base_url.trim_end_matches('/'),
            config.database
        );

        let auth_header = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                let credentials = format!("{username}:{}", password.expose_secret());
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(format!("Basic {encoded}"))
            }
            _ => None,
        };

        Ok(Self {
            client,
            commit_url,
            auth_header,
            api_base_url: api_base_url.into(),
        })
    }

    /// Runs a single statement and returns its result
    async fn run(&self, statement: &str) -> Result<StatementResult> {
        let mut request = self
            .client
            .post(&self.commit_url)
            .header("Accept", "application/json")
            .json(&TxRequest::single(statement));

        if let Some(auth) = &self.auth_header {
            request = request.header("Authorization", auth);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| SourceError::ConnectionFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::QueryFailed(format!("HTTP {status}: {body}")).into());
        }

        let body: TxResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        Ok(body.into_result()?)
    }

    fn to_concepts(&self, concept_type: &ConceptType, rows: Vec<ConceptRow>) -> Vec<Concept> {
        let total = rows.len();
        let concepts: Vec<Concept> = rows
            .into_iter()
            .filter_map(|row| row.into_concept(&self.api_base_url))
            .collect();

        if concepts.len() < total {
            tracing::warn!(
                concept_type = %concept_type,
                skipped = total - concepts.len(),
                "Skipped rows without a uuid"
            );
        }
        concepts
    }
}

#[async_trait]
impl ConceptSource for Neo4jClient {
    async fn read(
        &self,
        concept_type: &ConceptType,
        sink: mpsc::Sender<Concept>,
    ) -> Result<ReadOutcome> {
        let statement = statement_for(concept_type);
        let rows = self.run(&statement).await?.concept_rows()?;
        let concepts = self.to_concepts(concept_type, rows);

        if concepts.is_empty() {
            return Ok(ReadOutcome::Empty);
        }

        let count = concepts.len();
        tracing::debug!(concept_type = %concept_type, count, "Streaming concepts");

        let concept_type = concept_type.clone();
        tokio::spawn(async move {
            for concept in concepts {
                if sink.send(concept).await.is_err() {
                    tracing::warn!(concept_type = %concept_type, "Concept receiver dropped");
                    break;
                }
            }
        });

        Ok(ReadOutcome::Found(count))
    }
}

#[async_trait]
impl HealthCheck for Neo4jClient {
    fn name(&self) -> &str {
        "Neo4j"
    }

    async fn check_health(&self) -> Result<String> {
        self.run("RETURN 1").await.map_err(|e| {
            ExporterError::Source(SourceError::ConnectionFailed(format!(
                "Could not connect to Neo4j: {e}"
            )))
        })?;
        Ok("Neo4j could be reached".to_string())
    }
}
