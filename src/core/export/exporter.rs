//! Full export orchestration
//!
//! [`FullExporter`] owns the current job, asks the inquirer for workers and
//! drains them one at a time into the encoder, publishing each finished
//! buffer. Only one job can be active at a time.

use super::encoder::RecordEncoder;
use super::inquirer::Inquirer;
use super::job::{Job, JobSnapshot, State};
use super::worker::{FanIn, FinishOnDrop, Signal, Worker};
use crate::adapters::traits::ArtifactPublisher;
use crate::domain::{ConceptType, ExporterError, JobId, Result, TransactionId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Drives export jobs
pub struct FullExporter {
    job: Mutex<Option<Job>>,
    inquirer: Arc<dyn Inquirer>,
    publisher: Arc<dyn ArtifactPublisher>,
    encoder: Mutex<Box<dyn RecordEncoder>>,
}

impl FullExporter {
    pub fn new(
        inquirer: Arc<dyn Inquirer>,
        publisher: Arc<dyn ArtifactPublisher>,
        encoder: Box<dyn RecordEncoder>,
    ) -> Self {
        Self {
            job: Mutex::new(None),
            inquirer,
            publisher,
            encoder: Mutex::new(encoder),
        }
    }

    fn job(&self) -> MutexGuard<'_, Option<Job>> {
        self.job.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn encoder(&self) -> MutexGuard<'_, Box<dyn RecordEncoder>> {
        self.encoder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_job<R>(&self, f: impl FnOnce(&mut Job) -> R) -> Option<R> {
        self.job().as_mut().map(f)
    }

    /// Whether the current job is running
    pub fn is_running_job(&self) -> bool {
        self.job()
            .as_ref()
            .is_some_and(|job| job.status() == State::Running)
    }

    /// Snapshot of the current job, `None` before the first job
    pub fn current_job(&self) -> Option<JobSnapshot> {
        self.job().as_ref().map(Job::snapshot)
    }

    /// Replaces the current job with a new one in the `Starting` state
    ///
    /// Repeated concept types are kept once, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::JobAlreadyRunning`] while the current job is
    /// starting or running.
    pub fn create_job(
        &self,
        candidates: Vec<ConceptType>,
        error_message: impl Into<String>,
    ) -> Result<JobSnapshot> {
        let mut current = self.job();
        if current.as_ref().is_some_and(|job| job.status().is_active()) {
            return Err(ExporterError::JobAlreadyRunning);
        }

        let mut unique: Vec<ConceptType> = Vec::with_capacity(candidates.len());
        for concept_type in candidates {
            if !unique.contains(&concept_type) {
                unique.push(concept_type);
            }
        }

        let job = Job::new(unique, error_message);
        let snapshot = job.snapshot();
        tracing::info!(job_id = %job.id(), concept_types = ?job.concepts(), "Job created");
        *current = Some(job);
        Ok(snapshot)
    }

    /// Finishes the job with `job_id` if it is still `Starting`
    pub fn abandon(&self, job_id: &JobId) {
        self.with_job(|job| {
            if job.id() == job_id && job.status() == State::Starting {
                tracing::warn!(job_id = %job_id, "Job abandoned before it started");
                job.append_error("Job was abandoned before it started");
                job.set_status(State::Finished);
            }
        });
    }

    /// Runs the current job to completion
    ///
    /// Does nothing unless the current job is `Starting`. The job ends
    /// `Finished` however the run exits.
    pub async fn run_full_export(&self, tid: &TransactionId) {
        let started = {
            let mut current = self.job();
            match current.as_mut() {
                Some(job) if job.status() == State::Starting => {
                    job.set_status(State::Running);
                    Some((job.id().clone(), job.concepts().to_vec()))
                }
                _ => None,
            }
        };
        let Some((job_id, concepts)) = started else {
            tracing::error!(transaction_id = %tid, "No job to be run");
            return;
        };

        tracing::info!(transaction_id = %tid, job_id = %job_id, "Job started");
        let _finish = FinishJobOnDrop {
            exporter: self,
            job_id,
            started: Instant::now(),
        };

        let prepared = self.encoder().prepare(&concepts);
        if let Err(e) = prepared {
            tracing::error!(transaction_id = %tid, error = %e, "Preparing CSV writer failed");
            self.with_job(|job| job.append_error(&e.to_string()));
            return;
        }

        let workers = self.inquirer.inquire(&concepts, tid);
        self.with_job(|job| job.set_workers(workers.clone()));

        for worker in &workers {
            self.drain(worker, tid).await;
        }
    }

    async fn drain(&self, worker: &Worker, tid: &TransactionId) {
        let concept_type = worker.concept_type().clone();
        worker.set_status(State::Running);
        let _finish = FinishOnDrop(worker);
        self.with_job(|job| job.record_progress(concept_type.clone()));
        crate::log_worker_start!(concept_type, tid);

        let Some(channels) = worker.take_channels() else {
            self.fail(worker, "Concept channels were already consumed");
            return;
        };

        let mut signals = FanIn::new(channels);
        loop {
            match signals.next().await {
                Signal::Record(concept) => {
                    worker.increment_progress();
                    let written = self.encoder().write(&concept, &concept_type, tid);
                    if let Err(e) = written {
                        tracing::warn!(
                            transaction_id = %tid,
                            concept_type = %concept_type,
                            uuid = %concept.uuid,
                            error = %e,
                            "Failed to encode concept"
                        );
                        worker.append_error(&format!("Skipped concept {}: {e}", concept.uuid));
                    }
                }
                Signal::Done => {
                    self.publish(worker, tid).await;
                    return;
                }
                Signal::SourceError(e) => {
                    self.fail(worker, &e.to_string());
                    return;
                }
            }
        }
    }

    async fn publish(&self, worker: &Worker, tid: &TransactionId) {
        let concept_type = worker.concept_type();
        let finalized = {
            let mut encoder = self.encoder();
            encoder
                .bytes(concept_type)
                .map(|bytes| (bytes, encoder.file_name(concept_type)))
        };

        let result = match finalized {
            Ok((bytes, file_name)) => self
                .publisher
                .upload(bytes, &file_name, tid)
                .await
                .map(|()| file_name),
            Err(e) => Err(e),
        };

        match result {
            Ok(file_name) => tracing::info!(
                transaction_id = %tid,
                concept_type = %concept_type,
                file_name = %file_name,
                progress = worker.progress(),
                "Uploaded concepts"
            ),
            Err(e) => {
                tracing::error!(
                    transaction_id = %tid,
                    concept_type = %concept_type,
                    error = %e,
                    "Upload to S3 Writer failed"
                );
                self.fail(worker, &e.to_string());
            }
        }
    }

    fn fail(&self, worker: &Worker, message: &str) {
        self.with_job(|job| job.record_failure(worker.concept_type().clone()));
        worker.append_error(message);
    }
}

/// Marks the running job `Finished` when the run exits
struct FinishJobOnDrop<'a> {
    exporter: &'a FullExporter,
    job_id: JobId,
    started: Instant,
}

impl Drop for FinishJobOnDrop<'_> {
    fn drop(&mut self) {
        let failed = self.exporter.with_job(|job| {
            job.set_status(State::Finished);
            job.failed().len()
        });
        crate::log_export_complete!(self.job_id, failed.unwrap_or_default(), self.started.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::traits::{ConceptSource, ReadOutcome};
    use crate::core::export::encoder::CsvExporter;
    use crate::core::export::inquirer::SourceInquirer;
    use crate::core::export::worker::WorkerFeed;
    use crate::domain::concept::DEFAULT_API_BASE_URL;
    use crate::domain::{Concept, PublishError, SourceError};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::{mpsc, Notify};

    struct StaticSource;

    #[async_trait]
    impl ConceptSource for StaticSource {
        async fn read(
            &self,
            concept_type: &ConceptType,
            sink: mpsc::Sender<Concept>,
        ) -> Result<ReadOutcome> {
            let count = match concept_type.as_str() {
                "Brand" => 2,
                "Person" => 1,
                _ => return Ok(ReadOutcome::Empty),
            };
            let labels = vec![concept_type.to_string()];
            tokio::spawn(async move {
                for i in 0..count {
                    let concept = Concept::new(
                        DEFAULT_API_BASE_URL,
                        format!("uuid-{i}"),
                        format!("Label {i}"),
                        labels.clone(),
                    );
                    let _ = sink.send(concept).await;
                }
            });
            Ok(ReadOutcome::Found(count))
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        uploads: Mutex<Vec<(String, Vec<u8>)>>,
        fail: bool,
        gate: Option<Arc<Notify>>,
    }

    impl RecordingPublisher {
        fn uploads(&self) -> Vec<(String, Vec<u8>)> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtifactPublisher for RecordingPublisher {
        async fn upload(
            &self,
            bytes: Vec<u8>,
            file_name: &str,
            _tid: &TransactionId,
        ) -> Result<()> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.uploads
                .lock()
                .unwrap()
                .push((file_name.to_string(), bytes));
            if self.fail {
                return Err(PublishError::UnexpectedStatus { status: 503 }.into());
            }
            Ok(())
        }
    }

    struct BrokenEncoder;

    impl RecordEncoder for BrokenEncoder {
        fn prepare(&mut self, _concept_types: &[ConceptType]) -> Result<()> {
            Err(ExporterError::Encoding("header write failed".to_string()))
        }

        fn write(&mut self, _: &Concept, _: &ConceptType, _: &TransactionId) -> Result<()> {
            unreachable!("write after failed prepare")
        }

        fn bytes(&mut self, _: &ConceptType) -> Result<Vec<u8>> {
            unreachable!("bytes after failed prepare")
        }

        fn file_name(&self, concept_type: &ConceptType) -> String {
            format!("{concept_type}.csv")
        }
    }

    /// CSV encoder that refuses one uuid
    struct RejectingEncoder {
        inner: CsvExporter,
        rejected: &'static str,
    }

    impl RecordEncoder for RejectingEncoder {
        fn prepare(&mut self, concept_types: &[ConceptType]) -> Result<()> {
            self.inner.prepare(concept_types)
        }

        fn write(&mut self, concept: &Concept, concept_type: &ConceptType, tid: &TransactionId) -> Result<()> {
            if concept.uuid == self.rejected {
                return Err(ExporterError::Encoding("unwritable field".to_string()));
            }
            self.inner.write(concept, concept_type, tid)
        }

        fn bytes(&mut self, concept_type: &ConceptType) -> Result<Vec<u8>> {
            self.inner.bytes(concept_type)
        }

        fn file_name(&self, concept_type: &ConceptType) -> String {
            self.inner.file_name(concept_type)
        }
    }

    /// Hands out workers whose channels were filled ahead of time
    struct ScriptedInquirer;

    impl Inquirer for ScriptedInquirer {
        fn inquire(&self, candidates: &[ConceptType], _tid: &TransactionId) -> Vec<Arc<Worker>> {
            candidates
                .iter()
                .map(|concept_type| {
                    let (worker, WorkerFeed { records, errors }) =
                        Worker::new(concept_type.clone());
                    records
                        .try_send(Concept::new(DEFAULT_API_BASE_URL, "uuid-0", "partial", vec![]))
                        .unwrap();
                    errors
                        .try_send(SourceError::QueryFailed("connection reset".to_string()).into())
                        .unwrap();
                    worker
                })
                .collect()
        }
    }

    fn types(names: &[&str]) -> Vec<ConceptType> {
        names.iter().map(|n| ConceptType::new(*n).unwrap()).collect()
    }

    fn exporter_with(publisher: Arc<RecordingPublisher>) -> FullExporter {
        FullExporter::new(
            Arc::new(SourceInquirer::new(Arc::new(StaticSource))),
            publisher,
            Box::new(CsvExporter::new()),
        )
    }

    fn tid() -> TransactionId {
        TransactionId::new("tid_exporter").unwrap()
    }

    #[tokio::test]
    async fn test_brand_and_empty_organisation() {
        let publisher = Arc::new(RecordingPublisher::default());
        let exporter = exporter_with(publisher.clone());

        exporter
            .create_job(types(&["Brand", "Organisation"]), "")
            .unwrap();
        exporter.run_full_export(&tid()).await;

        let job = exporter.current_job().unwrap();
        assert_eq!(job.status, State::Finished);
        assert_eq!(job.progress, types(&["Brand", "Organisation"]));
        assert_eq!(job.failed, types(&["Organisation"]));

        let brand = job.worker("Brand").unwrap();
        assert_eq!((brand.count, brand.progress), (2, 2));
        assert_eq!(brand.status, State::Finished);
        assert!(brand.error_message.is_empty());

        let organisation = job.worker("Organisation").unwrap();
        assert_eq!(organisation.count, 0);
        assert_eq!(organisation.progress, 0);
        assert_eq!(organisation.status, State::Finished);
        assert!(organisation.error_message.contains("empty result"));

        let uploads = publisher.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "Brand.csv");
        let body = String::from_utf8(uploads[0].1.clone()).unwrap();
        assert_eq!(body.lines().count(), 3);
        assert!(body.starts_with("id,prefLabel,apiUrl\n"));
    }

    #[tokio::test]
    async fn test_repeated_type_is_exported_once() {
        let publisher = Arc::new(RecordingPublisher::default());
        let exporter = exporter_with(publisher.clone());

        let created = exporter
            .create_job(types(&["Brand", "Person", "Brand"]), "")
            .unwrap();
        assert_eq!(created.concepts, types(&["Brand", "Person"]));
        exporter.run_full_export(&tid()).await;

        let job = exporter.current_job().unwrap();
        assert_eq!(job.progress, types(&["Brand", "Person"]));
        assert_eq!(job.workers.len(), 2);

        let uploads = publisher.uploads();
        let names: Vec<&str> = uploads.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Brand.csv", "Person.csv"]);
        let body = String::from_utf8(uploads[0].1.clone()).unwrap();
        assert_eq!(body.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_encode_failure_is_reported_on_worker() {
        let publisher = Arc::new(RecordingPublisher::default());
        let exporter = FullExporter::new(
            Arc::new(SourceInquirer::new(Arc::new(StaticSource))),
            publisher.clone(),
            Box::new(RejectingEncoder {
                inner: CsvExporter::new(),
                rejected: "uuid-1",
            }),
        );

        exporter.create_job(types(&["Brand"]), "").unwrap();
        exporter.run_full_export(&tid()).await;

        let job = exporter.current_job().unwrap();
        assert!(job.failed.is_empty());
        let brand = job.worker("Brand").unwrap();
        assert_eq!(brand.progress, 2);
        assert_eq!(
            brand.error_message,
            "Skipped concept uuid-1: Encoding error: unwritable field"
        );

        let uploads = publisher.uploads();
        assert_eq!(uploads.len(), 1);
        let body = String::from_utf8(uploads[0].1.clone()).unwrap();
        assert_eq!(body.lines().count(), 2);
        assert!(!body.contains("uuid-1"));
    }

    #[tokio::test]
    async fn test_abandon_only_finishes_starting_job() {
        let exporter = exporter_with(Arc::new(RecordingPublisher::default()));

        let first = exporter.create_job(types(&["Brand"]), "").unwrap();
        exporter.abandon(&JobId::generate());
        assert_eq!(exporter.current_job().unwrap().status, State::Starting);

        exporter.abandon(&first.id);
        let abandoned = exporter.current_job().unwrap();
        assert_eq!(abandoned.status, State::Finished);
        assert_eq!(abandoned.error_message, "Job was abandoned before it started");

        let second = exporter.create_job(types(&["Person"]), "").unwrap();
        exporter.run_full_export(&tid()).await;
        exporter.abandon(&second.id);
        let finished = exporter.current_job().unwrap();
        assert_eq!(finished.status, State::Finished);
        assert!(finished.error_message.is_empty());
    }

    #[tokio::test]
    async fn test_create_job_rejected_while_active() {
        let gate = Arc::new(Notify::new());
        let publisher = Arc::new(RecordingPublisher {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let exporter = Arc::new(exporter_with(publisher));

        exporter.create_job(types(&["Brand"]), "").unwrap();
        assert!(matches!(
            exporter.create_job(types(&["Person"]), ""),
            Err(ExporterError::JobAlreadyRunning)
        ));

        let running = {
            let exporter = Arc::clone(&exporter);
            tokio::spawn(async move { exporter.run_full_export(&tid()).await })
        };
        while !exporter.is_running_job() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(matches!(
            exporter.create_job(types(&["Person"]), ""),
            Err(ExporterError::JobAlreadyRunning)
        ));

        gate.notify_one();
        running.await.unwrap();

        assert!(!exporter.is_running_job());
        let next = exporter.create_job(types(&["Person"]), "").unwrap();
        assert_eq!(next.status, State::Starting);
        assert_eq!(next.concepts, types(&["Person"]));
    }

    #[tokio::test]
    async fn test_publish_failure_marks_type_failed() {
        let publisher = Arc::new(RecordingPublisher {
            fail: true,
            ..Default::default()
        });
        let exporter = exporter_with(publisher.clone());

        exporter.create_job(types(&["Brand"]), "").unwrap();
        exporter.run_full_export(&tid()).await;

        let job = exporter.current_job().unwrap();
        assert_eq!(job.failed, types(&["Brand"]));
        let brand = job.worker("Brand").unwrap();
        assert_eq!(brand.progress, 2);
        assert_eq!(brand.error_message, "Export RW S3 returned HTTP 503");
        assert_eq!(publisher.uploads().len(), 1);
    }

    #[tokio::test]
    async fn test_prepare_failure_aborts_job() {
        let publisher = Arc::new(RecordingPublisher::default());
        let exporter = FullExporter::new(
            Arc::new(SourceInquirer::new(Arc::new(StaticSource))),
            publisher.clone(),
            Box::new(BrokenEncoder),
        );

        exporter
            .create_job(types(&["Brand"]), "There are unsupported concept types within the candidates: [Foo]")
            .unwrap();
        exporter.run_full_export(&tid()).await;

        let job = exporter.current_job().unwrap();
        assert_eq!(job.status, State::Finished);
        assert!(job.workers.is_empty());
        assert!(job.progress.is_empty());
        assert!(job.error_message.starts_with("There are unsupported"));
        assert!(job.error_message.ends_with("Encoding error: header write failed"));
        assert!(publisher.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_error_after_partial_records_skips_publish() {
        let publisher = Arc::new(RecordingPublisher::default());
        let exporter = FullExporter::new(
            Arc::new(ScriptedInquirer),
            publisher.clone(),
            Box::new(CsvExporter::new()),
        );

        exporter.create_job(types(&["Topic"]), "").unwrap();
        exporter.run_full_export(&tid()).await;

        let job = exporter.current_job().unwrap();
        assert_eq!(job.failed, types(&["Topic"]));
        let topic = job.worker("Topic").unwrap();
        assert!(topic.progress <= 1);
        assert!(topic.error_message.contains("connection reset"));
        assert_eq!(topic.status, State::Finished);
        assert!(publisher.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_run_without_starting_job_is_noop() {
        let publisher = Arc::new(RecordingPublisher::default());
        let exporter = exporter_with(publisher.clone());

        exporter.run_full_export(&tid()).await;
        assert!(exporter.current_job().is_none());

        exporter.create_job(types(&["Person"]), "").unwrap();
        exporter.run_full_export(&tid()).await;
        let finished = exporter.current_job().unwrap();

        exporter.run_full_export(&tid()).await;
        assert_eq!(exporter.current_job().unwrap(), finished);
        assert_eq!(publisher.uploads().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshots_are_stable_after_finish() {
        let exporter = exporter_with(Arc::new(RecordingPublisher::default()));
        exporter
            .create_job(types(&["Brand", "Person", "Topic"]), "")
            .unwrap();
        exporter.run_full_export(&tid()).await;

        let first = exporter.current_job().unwrap();
        let second = exporter.current_job().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
