//! Export job state
//!
//! A [`Job`] is the aggregate state of one export run. It lives inside the
//! exporter's lock and is only ever handed out as a [`JobSnapshot`].

use super::worker::Worker;
use crate::domain::{ConceptType, JobId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle state shared by jobs and workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Starting,
    Running,
    Finished,
}

impl State {
    /// Whether the job or worker has started but not yet finished
    pub fn is_active(self) -> bool {
        matches!(self, State::Starting | State::Running)
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            State::Starting => "Starting",
            State::Running => "Running",
            State::Finished => "Finished",
        };
        f.write_str(name)
    }
}

/// One export run across a set of concept types
#[derive(Debug)]
pub struct Job {
    id: JobId,
    concepts: Vec<ConceptType>,
    workers: Vec<Arc<Worker>>,
    progress: Vec<ConceptType>,
    failed: Vec<ConceptType>,
    status: State,
    error_message: String,
}

impl Job {
    /// Creates a job in the `Starting` state
    pub fn new(concepts: Vec<ConceptType>, error_message: impl Into<String>) -> Self {
        Self {
            id: JobId::generate(),
            concepts,
            workers: Vec::new(),
            progress: Vec::new(),
            failed: Vec::new(),
            status: State::Starting,
            error_message: error_message.into(),
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn concepts(&self) -> &[ConceptType] {
        &self.concepts
    }

    pub fn status(&self) -> State {
        self.status
    }

    pub fn failed(&self) -> &[ConceptType] {
        &self.failed
    }

    pub(crate) fn set_status(&mut self, status: State) {
        self.status = status;
    }

    pub(crate) fn set_workers(&mut self, workers: Vec<Arc<Worker>>) {
        self.workers = workers;
    }

    pub(crate) fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }

    pub(crate) fn record_progress(&mut self, concept_type: ConceptType) {
        self.progress.push(concept_type);
    }

    pub(crate) fn record_failure(&mut self, concept_type: ConceptType) {
        self.failed.push(concept_type);
    }

    pub(crate) fn append_error(&mut self, message: &str) {
        append_message(&mut self.error_message, message);
    }

    /// Value copy of the job, reading each worker through its lock
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            status: self.status,
            error_message: self.error_message.clone(),
            concepts: self.concepts.clone(),
            progress: self.progress.clone(),
            failed: self.failed.clone(),
            workers: self.workers.iter().map(|w| w.snapshot()).collect(),
        }
    }
}

/// Appends `message` to `target`, separated by a space
pub(crate) fn append_message(target: &mut String, message: &str) {
    if message.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(message);
}

/// Point-in-time copy of a job, as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobSnapshot {
    #[serde(rename = "ID")]
    pub id: JobId,

    pub status: State,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<ConceptType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub progress: Vec<ConceptType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<ConceptType>,

    #[serde(
        rename = "ConceptWorkers",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub workers: Vec<WorkerSnapshot>,
}

impl JobSnapshot {
    /// The snapshot of the worker for `concept_type`, if any
    pub fn worker(&self, concept_type: &str) -> Option<&WorkerSnapshot> {
        self.workers
            .iter()
            .find(|w| w.concept_type.as_str() == concept_type)
    }
}

/// Point-in-time copy of a worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkerSnapshot {
    pub concept_type: ConceptType,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub count: usize,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub progress: usize,

    pub status: State,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_message: String,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}
