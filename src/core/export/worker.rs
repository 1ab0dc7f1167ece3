//! Per-concept-type workers
//!
//! A worker pairs two channels, fed by the inquiry task, with the mutable
//! progress state read by the job snapshot. Scalar state sits behind a
//! per-worker lock; the channels are the only unlocked path between tasks.

use super::job::{append_message, State, WorkerSnapshot};
use crate::domain::{Concept, ConceptType, ExporterError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Smallest capacity tokio allows; the producer waits for every hand-off
pub const RECORD_CHANNEL_CAPACITY: usize = 1;

/// Room for the single terminal error without ever blocking the producer
pub const ERROR_CHANNEL_CAPACITY: usize = 2;

#[derive(Debug)]
struct WorkerState {
    count: usize,
    progress: usize,
    status: State,
    error_message: String,
}

/// Receiving ends of a worker's channels
#[derive(Debug)]
pub struct WorkerChannels {
    pub records: mpsc::Receiver<Concept>,
    pub errors: mpsc::Receiver<ExporterError>,
}

/// Sending ends of a worker's channels, owned by the producer side
#[derive(Debug)]
pub struct WorkerFeed {
    pub records: mpsc::Sender<Concept>,
    pub errors: mpsc::Sender<ExporterError>,
}

/// Unit of work for one concept type
#[derive(Debug)]
pub struct Worker {
    concept_type: ConceptType,
    state: Mutex<WorkerState>,
    channels: Mutex<Option<WorkerChannels>>,
}

impl Worker {
    /// Creates a worker in the `Starting` state, returning the producer's
    /// ends of its channels alongside it
    pub fn new(concept_type: ConceptType) -> (Arc<Self>, WorkerFeed) {
        let (records_tx, records_rx) = mpsc::channel(RECORD_CHANNEL_CAPACITY);
        let (errors_tx, errors_rx) = mpsc::channel(ERROR_CHANNEL_CAPACITY);

        let worker = Arc::new(Self {
            concept_type,
            state: Mutex::new(WorkerState {
                count: 0,
                progress: 0,
                status: State::Starting,
                error_message: String::new(),
            }),
            channels: Mutex::new(Some(WorkerChannels {
                records: records_rx,
                errors: errors_rx,
            })),
        });

        let feed = WorkerFeed {
            records: records_tx,
            errors: errors_tx,
        };
        (worker, feed)
    }

    pub fn concept_type(&self) -> &ConceptType {
        &self.concept_type
    }

    fn state(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn count(&self) -> usize {
        self.state().count
    }

    pub fn set_count(&self, count: usize) {
        self.state().count = count;
    }

    pub fn progress(&self) -> usize {
        self.state().progress
    }

    pub fn increment_progress(&self) {
        self.state().progress += 1;
    }

    pub fn status(&self) -> State {
        self.state().status
    }

    pub fn set_status(&self, status: State) {
        self.state().status = status;
    }

    pub fn error_message(&self) -> String {
        self.state().error_message.clone()
    }

    pub fn append_error(&self, message: &str) {
        append_message(&mut self.state().error_message, message);
    }

    /// Hands the receiving ends to the drain loop; `None` once taken
    pub fn take_channels(&self) -> Option<WorkerChannels> {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn snapshot(&self) -> WorkerSnapshot {
        let state = self.state();
        WorkerSnapshot {
            concept_type: self.concept_type.clone(),
            count: state.count,
            progress: state.progress,
            status: state.status,
            error_message: state.error_message.clone(),
        }
    }
}

/// Sets a worker's status to `Finished` when dropped
pub(crate) struct FinishOnDrop<'a>(pub &'a Worker);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set_status(State::Finished);
    }
}

/// What the drain loop should do next
#[derive(Debug)]
pub enum Signal {
    /// A concept arrived
    Record(Concept),

    /// The source reported a failure for this concept type
    SourceError(ExporterError),

    /// All records were delivered and no error was reported
    Done,
}

enum Wake {
    Record(Option<Concept>),
    Error(Option<ExporterError>),
}

/// Merges a worker's record and error channels into a stream of [`Signal`]s
///
/// `Done` is only produced once both channels are closed and no error was
/// received. A record channel that closes while the error channel is still
/// open keeps the fan-in waiting on the error channel.
pub struct FanIn {
    records: Option<mpsc::Receiver<Concept>>,
    errors: Option<mpsc::Receiver<ExporterError>>,
}

impl FanIn {
    pub fn new(channels: WorkerChannels) -> Self {
        Self {
            records: Some(channels.records),
            errors: Some(channels.errors),
        }
    }

    pub async fn next(&mut self) -> Signal {
        loop {
            let wake = match (self.records.as_mut(), self.errors.as_mut()) {
                (Some(records), Some(errors)) => tokio::select! {
                    record = records.recv() => Wake::Record(record),
                    error = errors.recv() => Wake::Error(error),
                },
                (Some(records), None) => Wake::Record(records.recv().await),
                (None, Some(errors)) => Wake::Error(errors.recv().await),
                (None, None) => return Signal::Done,
            };

            match wake {
                Wake::Record(Some(concept)) => return Signal::Record(concept),
                Wake::Record(None) => self.records = None,
                Wake::Error(Some(error)) => return Signal::SourceError(error),
                Wake::Error(None) => self.errors = None,
            }
        }
    }
}
