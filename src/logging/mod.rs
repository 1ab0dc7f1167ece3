//! Logging and observability
//!
//! Structured logging through `tracing`, with:
//! - Pretty or JSON console output
//! - Configurable log levels (overridable through `RUST_LOG`)
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use concept_exporter::logging::init_logging;
//! use concept_exporter::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a concept type drain
///
/// # Example
///
/// ```no_run
/// use concept_exporter::log_worker_start;
/// use concept_exporter::domain::{ConceptType, TransactionId};
///
/// let concept_type = ConceptType::new("Brand").unwrap();
/// let tid = TransactionId::generate();
/// log_worker_start!(&concept_type, &tid);
/// ```
#[macro_export]
macro_rules! log_worker_start {
    ($concept_type:expr, $tid:expr) => {
        tracing::info!(
            concept_type = %$concept_type,
            transaction_id = %$tid,
            "Starting concept export"
        );
    };
}

/// Log the completion of a full export
///
/// # Example
///
/// ```no_run
/// use concept_exporter::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!("job_1", 2, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($job_id:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            job_id = %$job_id,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Full export finished"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use concept_exporter::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
