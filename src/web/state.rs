//! Application state for the HTTP service

use crate::config::ApplicationConfig;
use crate::core::export::ExportService;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// The export service driving jobs
    pub service: Arc<ExportService>,

    /// Application identity reported by the health endpoints
    pub application: Arc<ApplicationConfig>,
}

impl AppState {
    pub fn new(service: Arc<ExportService>, application: ApplicationConfig) -> Self {
        Self {
            service,
            application: Arc::new(application),
        }
    }
}
