//! Validate config command implementation

use crate::config::load_config;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates, so any error here is reported as a
    /// configuration error.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Application: {}", config.application.name);
        println!("  System Code: {}", config.application.system_code);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Listen Address: {}", config.server.listen_address());
        println!("  Neo4j: {} ({})", config.neo4j.base_url, config.neo4j.database);
        println!(
            "  Neo4j Auth: {}",
            match (&config.neo4j.username, &config.neo4j.password) {
                (Some(user), Some(password)) if !password.expose_secret().is_empty() =>
                    format!("basic ({user})"),
                _ => "none".to_string(),
            }
        );
        println!("  S3 Writer: {}", config.s3_writer.base_url);
        println!("  S3 Writer Health: {}", config.s3_writer.health_url());
        println!("  Upload Retries: {}", config.s3_writer.retry.max_retries);
        println!("  Concept Types: {:?}", config.export.concept_types);
        println!("  API Base URL: {}", config.export.api_base_url);
        println!();
        Ok(0)
    }
}
