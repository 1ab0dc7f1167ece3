//! Export orchestration
//!
//! This module provides the core export logic:
//! - Job and worker state ([`job`], [`worker`])
//! - Inquiry of the concept source ([`inquirer`])
//! - CSV buffering ([`encoder`])
//! - The job driver ([`exporter`]) and its service wiring ([`service`])

pub mod encoder;
pub mod exporter;
pub mod inquirer;
pub mod job;
pub mod service;
pub mod worker;

pub use encoder::{CsvExporter, RecordEncoder};
pub use exporter::FullExporter;
pub use inquirer::{Inquirer, SourceInquirer};
pub use job::{Job, JobSnapshot, State, WorkerSnapshot};
pub use service::ExportService;
pub use worker::{FanIn, Signal, Worker, WorkerChannels, WorkerFeed};
