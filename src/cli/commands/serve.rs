//! Serve command implementation
//!
//! Runs the HTTP service until a shutdown signal arrives.

use super::load_settings;
use crate::core::export::ExportService;
use crate::web::{self, AppState};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the listening port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_settings(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(port) = self.port {
            tracing::info!(port, "Overriding port from CLI");
            config.server.port = port;
        }

        let service = match ExportService::from_config(&config) {
            Ok(service) => service,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize export service");
                eprintln!("Failed to initialize export service: {e}");
                return Ok(4);
            }
        };

        tracing::info!(
            supported = ?service.supported(),
            neo4j = %config.neo4j.base_url,
            s3_writer = %config.s3_writer.base_url,
            "Export service ready"
        );

        let state = AppState::new(Arc::new(service), config.application.clone());
        web::serve(&config.server, state, shutdown_signal).await?;

        Ok(0)
    }
}
