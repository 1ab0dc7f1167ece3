//! Export command implementation
//!
//! Runs one full export in the foreground and prints the final job as JSON.

use super::load_settings;
use crate::core::export::ExportService;
use crate::domain::TransactionId;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Concept types to export (comma-separated, default: all supported)
    #[arg(long, value_delimiter = ',')]
    pub concept_types: Vec<String>,

    /// Transaction id used for logging and upload requests
    #[arg(long)]
    pub transaction_id: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_settings(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let service = match ExportService::from_config(&config) {
            Ok(service) => service,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize export service");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4);
            }
        };

        let requested: Vec<String> = self
            .concept_types
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let tid = TransactionId::from_header(self.transaction_id.as_deref());

        let job = tokio::select! {
            result = service.run_export(&requested, &tid) => result?,
            Ok(_) = shutdown_signal.wait_for(|stop| *stop) => {
                tracing::warn!(transaction_id = %tid, "Export interrupted by shutdown signal");
                eprintln!("Export interrupted");
                return Ok(130);
            }
        };

        println!("{}", serde_json::to_string_pretty(&job)?);

        if job.failed.is_empty() {
            Ok(0)
        } else {
            tracing::warn!(failed = ?job.failed, "Export completed with failures");
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_args_defaults() {
        let args = ExportArgs {
            concept_types: Vec::new(),
            transaction_id: None,
        };

        assert!(args.concept_types.is_empty());
        assert!(args.transaction_id.is_none());
    }
}
