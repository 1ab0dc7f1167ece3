//! Init command implementation
//!
//! Writes a sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "concept-exporter.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(()) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your Neo4j and S3 writer URLs", self.output);
                println!("  2. Set NEO4J_PASSWORD in the environment or a .env file");
                println!("  3. Validate configuration: concept-exporter validate-config");
                println!("  4. Start the service: concept-exporter serve");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn sample_config() -> &'static str {
        r#"# Concept Exporter Configuration File
# Exports concepts from Neo4j as CSV files to Export RW S3

[application]
name = "concept-exporter"
system_code = "concept-exporter"
log_level = "info"

[server]
bind_address = "0.0.0.0"
port = 8080
request_timeout_seconds = 60

[neo4j]
base_url = "http://localhost:7474"
database = "neo4j"
# Basic auth; leave both unset for an unauthenticated database
# username = "neo4j"
# password = "${NEO4J_PASSWORD}"
timeout_seconds = 300

[s3_writer]
base_url = "http://localhost:8080"
# Defaults to <base_url>/__gtg
# health_url = "http://localhost:8080/__gtg"
timeout_seconds = 30

[s3_writer.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 10000
backoff_multiplier = 2.0

[export]
concept_types = ["Brand", "Topic", "Location", "Person", "Organisation"]
api_base_url = "http://api.ft.com"

[logging]
local_enabled = false
local_path = "/var/log/concept-exporter"
local_rotation = "daily"   # daily | hourly | never
console_format = "pretty"  # pretty | json
"#
    }
}
