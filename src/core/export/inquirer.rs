//! Inquiry: turning candidate concept types into running workers

use super::worker::{Worker, WorkerFeed};
use crate::adapters::traits::{ConceptSource, ReadOutcome};
use crate::domain::{ConceptType, SourceError, TransactionId};
use std::sync::Arc;

/// Creates one worker per concept type and starts feeding them
pub trait Inquirer: Send + Sync {
    /// Returns the workers immediately; reads continue in the background
    ///
    /// Must be called from within a tokio runtime.
    fn inquire(&self, candidates: &[ConceptType], tid: &TransactionId) -> Vec<Arc<Worker>>;
}

/// [`Inquirer`] that reads each concept type from a [`ConceptSource`]
///
/// Reads run one after another on a single background task. Each worker's
/// error sender is dropped as soon as that worker's outcome is known, so the
/// error channel closes whether or not an error was reported.
pub struct SourceInquirer {
    source: Arc<dyn ConceptSource>,
}

impl SourceInquirer {
    pub fn new(source: Arc<dyn ConceptSource>) -> Self {
        Self { source }
    }
}

impl Inquirer for SourceInquirer {
    fn inquire(&self, candidates: &[ConceptType], tid: &TransactionId) -> Vec<Arc<Worker>> {
        let (workers, feeds): (Vec<Arc<Worker>>, Vec<WorkerFeed>) = candidates
            .iter()
            .map(|concept_type| Worker::new(concept_type.clone()))
            .unzip();

        let pending: Vec<(Arc<Worker>, WorkerFeed)> =
            workers.iter().cloned().zip(feeds).collect();
        let source = Arc::clone(&self.source);
        let tid = tid.clone();
        let candidates: Vec<String> = candidates.iter().map(ToString::to_string).collect();

        tokio::spawn(async move {
            tracing::info!(
                transaction_id = %tid,
                concept_types = ?candidates,
                "Starting reading concepts from Neo4j"
            );

            for (worker, feed) in pending {
                read_into(source.as_ref(), &worker, feed, &tid).await;
            }

            tracing::info!(transaction_id = %tid, "Finished Neo4j read");
        });

        workers
    }
}

async fn read_into(
    source: &dyn ConceptSource,
    worker: &Worker,
    feed: WorkerFeed,
    tid: &TransactionId,
) {
    let WorkerFeed { records, errors } = feed;
    let concept_type = worker.concept_type();

    let failure = match source.read(concept_type, records).await {
        Ok(ReadOutcome::Found(count)) => {
            tracing::info!(
                transaction_id = %tid,
                concept_type = %concept_type,
                count,
                "Found concepts"
            );
            worker.set_count(count);
            None
        }
        Ok(ReadOutcome::Empty) => Some(
            SourceError::EmptyResult {
                concept_type: concept_type.to_string(),
            }
            .into(),
        ),
        Err(e) => Some(e),
    };

    if let Some(error) = failure {
        tracing::error!(
            transaction_id = %tid,
            concept_type = %concept_type,
            error = %error,
            "Reading concept type failed"
        );
        if errors.send(error).await.is_err() {
            tracing::debug!(concept_type = %concept_type, "Worker no longer listening for errors");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::job::State;
    use crate::core::export::worker::{FanIn, Signal};
    use crate::domain::concept::DEFAULT_API_BASE_URL;
    use crate::domain::{Concept, ExporterError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::mpsc;

    /// Source answering from a fixed table; unknown types fail
    struct TableSource {
        table: HashMap<String, usize>,
    }

    #[async_trait]
    impl ConceptSource for TableSource {
        async fn read(
            &self,
            concept_type: &ConceptType,
            sink: mpsc::Sender<Concept>,
        ) -> Result<ReadOutcome> {
            let count = *self.table.get(concept_type.as_str()).ok_or_else(|| {
                ExporterError::from(SourceError::QueryFailed("no such label".to_string()))
            })?;
            if count == 0 {
                return Ok(ReadOutcome::Empty);
            }
            tokio::spawn(async move {
                for i in 0..count {
                    let concept =
                        Concept::new(DEFAULT_API_BASE_URL, format!("uuid-{i}"), "label", vec![]);
                    if sink.send(concept).await.is_err() {
                        break;
                    }
                }
            });
            Ok(ReadOutcome::Found(count))
        }
    }

    fn inquirer(entries: &[(&str, usize)]) -> SourceInquirer {
        let table = entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        SourceInquirer::new(Arc::new(TableSource { table }))
    }

    fn types(names: &[&str]) -> Vec<ConceptType> {
        names.iter().map(|n| ConceptType::new(*n).unwrap()).collect()
    }

    async fn drain(worker: &Worker) -> (usize, Option<ExporterError>) {
        let mut signals = FanIn::new(worker.take_channels().unwrap());
        let mut received = 0;
        loop {
            match signals.next().await {
                Signal::Record(_) => received += 1,
                Signal::SourceError(e) => return (received, Some(e)),
                Signal::Done => return (received, None),
            }
        }
    }

    #[tokio::test]
    async fn test_inquire_returns_workers_in_order() {
        let tid = TransactionId::generate();
        let workers = inquirer(&[("Brand", 1), ("Person", 1)])
            .inquire(&types(&["Brand", "Person"]), &tid);

        assert_eq!(workers.len(), 2);
        assert_eq!(workers[0].concept_type().as_str(), "Brand");
        assert_eq!(workers[1].concept_type().as_str(), "Person");
        assert!(workers.iter().all(|w| w.status() == State::Starting));
    }

    #[tokio::test]
    async fn test_inquire_streams_and_sets_count() {
        let tid = TransactionId::generate();
        let workers = inquirer(&[("Brand", 3)]).inquire(&types(&["Brand"]), &tid);

        let (received, error) = drain(&workers[0]).await;
        assert_eq!(received, 3);
        assert!(error.is_none());
        assert_eq!(workers[0].count(), 3);
    }

    #[tokio::test]
    async fn test_inquire_reports_empty_result() {
        let tid = TransactionId::generate();
        let workers = inquirer(&[("Organisation", 0)]).inquire(&types(&["Organisation"]), &tid);

        let (received, error) = drain(&workers[0]).await;
        assert_eq!(received, 0);
        assert_eq!(
            error.unwrap().to_string(),
            "Reading Organisation concept type from Neo4j returned empty result"
        );
        assert_eq!(workers[0].count(), 0);
    }

    #[tokio::test]
    async fn test_inquire_failure_does_not_stop_other_types() {
        let tid = TransactionId::generate();
        let workers =
            inquirer(&[("Brand", 2)]).inquire(&types(&["Location", "Brand"]), &tid);

        let (_, error) = drain(&workers[0]).await;
        assert!(matches!(
            error,
            Some(ExporterError::Source(SourceError::QueryFailed(_)))
        ));

        let (received, error) = drain(&workers[1]).await;
        assert_eq!(received, 2);
        assert!(error.is_none());
    }
}
