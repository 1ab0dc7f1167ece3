//! CLI command implementations
//!
//! Exit codes shared by the commands:
//! - `0` success
//! - `1` export finished with failed concept types
//! - `2` configuration error
//! - `4` a dependency could not be initialized
//! - `5` fatal error

pub mod export;
pub mod init;
pub mod serve;
pub mod validate;

use crate::config::{load_config, load_from_env, ExporterConfig};
use crate::domain::Result;
use std::path::Path;

/// Loads the configuration file if it exists, otherwise builds the
/// configuration from defaults and environment overrides
pub fn load_settings(config_path: &str) -> Result<ExporterConfig> {
    if Path::new(config_path).exists() {
        load_config(config_path)
    } else {
        tracing::info!(
            config_path = %config_path,
            "Configuration file not found, using defaults and environment"
        );
        load_from_env()
    }
}
